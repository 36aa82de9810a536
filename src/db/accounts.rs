use crate::db::models::{Account, AccountRow};
use crate::db::sqlite::GuessStore;
use crate::error::{GuessError, is_unique_violation};
use tracing::debug;

impl GuessStore {
    /// Register `username`, storing only an Argon2id hash of `password`.
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, GuessError> {
        let password_hash = self.passwords.hash(password).await?;

        let res = sqlx::query("INSERT INTO account (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await;

        match res {
            Ok(done) => {
                let id = done.last_insert_rowid();
                debug!(id, username, "account created");
                Ok(Account {
                    id,
                    username: username.to_string(),
                })
            }
            Err(e) if is_unique_violation(&e) => {
                Err(GuessError::DuplicateUsername(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Exact-match lookup; `None` when nobody has that username.
    pub async fn get_account(&self, username: &str) -> Result<Option<Account>, GuessError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, username FROM account WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    /// `Some(account)` iff `username` exists and `password` matches its hash.
    ///
    /// An unknown username returns immediately without running the hash, so
    /// it answers faster than a wrong password does.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, GuessError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, username, password_hash FROM account WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!(username, "authentication failed: unknown user");
            return Ok(None);
        };

        if self.passwords.verify(&row.password_hash, password).await? {
            Ok(Some(row.into()))
        } else {
            debug!(username, "authentication failed: wrong password");
            Ok(None)
        }
    }
}

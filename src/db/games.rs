use crate::db::models::{Game, GameRecord, Guess, NewGame};
use crate::db::sqlite::{GuessStore, parse_timestamp};
use crate::error::{GuessError, is_foreign_key_violation};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};
use std::collections::HashMap;
use tracing::debug;

const RECORD_SELECT: &str = r#"SELECT game.id AS id, game.secret AS secret,
       game.completed AS completed, game.completed_at AS completed_at,
       account.username AS username
  FROM game JOIN account ON game.account_id = account.id"#;

impl GuessStore {
    /// Start a game for `account_id`; it stays incomplete until `update_game`.
    pub async fn add_game(&self, secret: i64, account_id: i64) -> Result<Game, GuessError> {
        insert_game(&self.pool, secret, account_id).await
    }

    /// Persist `completed` / `completed_at` of an existing game.
    pub async fn update_game(&self, game: Game) -> Result<Game, GuessError> {
        write_completion(&self.pool, &game).await?;
        Ok(game)
    }

    /// Append a guess stamped with the current time.
    pub async fn add_guess(&self, game_id: i64, value: i64) -> Result<Guess, GuessError> {
        let time = Utc::now().timestamp_millis();
        insert_guess(&self.pool, game_id, value, time).await
    }

    /// Append a guess made at `time` (epoch millis).
    pub async fn add_guess_at(
        &self,
        game_id: i64,
        value: i64,
        time: i64,
    ) -> Result<Guess, GuessError> {
        insert_guess(&self.pool, game_id, value, time).await
    }

    /// Store a finished round: insert the game, mark it complete and append
    /// its guesses in order. All or nothing.
    pub async fn record_game(&self, new_game: NewGame) -> Result<Game, GuessError> {
        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let game = insert_game(&mut *tx, new_game.secret, new_game.account_id)
            .await?
            .complete(now);
        write_completion(&mut *tx, &game).await?;

        // one base stamp, offset by position, keeps the supplied order on read
        let base = now.timestamp_millis();
        for (i, value) in new_game.guesses.iter().enumerate() {
            insert_guess(&mut *tx, game.id, *value, base + i as i64).await?;
        }

        tx.commit().await?;
        debug!(
            id = game.id,
            account_id = game.account_id,
            guesses = new_game.guesses.len(),
            "game recorded"
        );
        Ok(game)
    }

    pub async fn get_game(&self, game_id: i64) -> Result<GameRecord, GuessError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{RECORD_SELECT} WHERE game.id = ?");
        let row = sqlx::query(&sql)
            .bind(game_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| GuessError::game_not_found(game_id))?;

        let guesses: Vec<i64> = sqlx::query_scalar(
            "SELECT value FROM guess WHERE game_id = ? ORDER BY time ASC, rowid ASC",
        )
        .bind(game_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Self::row_to_record(row, guesses)
    }

    /// Every completed game, oldest id first.
    pub async fn get_games(&self) -> Result<Vec<GameRecord>, GuessError> {
        self.completed_records(None).await
    }

    /// Completed games owned by `account_id`, oldest id first.
    pub async fn get_games_for_account(
        &self,
        account_id: i64,
    ) -> Result<Vec<GameRecord>, GuessError> {
        self.completed_records(Some(account_id)).await
    }

    pub async fn completed_game_count(&self) -> Result<i64, GuessError> {
        let n = sqlx::query_scalar("SELECT COUNT(*) FROM game WHERE completed = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn completed_records(
        &self,
        account_id: Option<i64>,
    ) -> Result<Vec<GameRecord>, GuessError> {
        let owner_filter = if account_id.is_some() {
            " AND game.account_id = ?"
        } else {
            ""
        };
        let games_sql =
            format!("{RECORD_SELECT} WHERE game.completed = 1{owner_filter} ORDER BY game.id");
        let guesses_sql = format!(
            r#"SELECT guess.game_id, guess.value FROM guess
                 JOIN game ON guess.game_id = game.id
                WHERE game.completed = 1{owner_filter}
                ORDER BY guess.game_id, guess.time ASC, guess.rowid ASC"#
        );

        // one snapshot for both queries
        let mut tx = self.pool.begin().await?;

        let mut games_q = sqlx::query(&games_sql);
        let mut guesses_q = sqlx::query_as::<_, (i64, i64)>(&guesses_sql);
        if let Some(id) = account_id {
            games_q = games_q.bind(id);
            guesses_q = guesses_q.bind(id);
        }
        let rows = games_q.fetch_all(&mut *tx).await?;
        let guess_rows = guesses_q.fetch_all(&mut *tx).await?;

        tx.commit().await?;

        let mut by_game: HashMap<i64, Vec<i64>> = HashMap::new();
        for (game_id, value) in guess_rows {
            by_game.entry(game_id).or_default().push(value);
        }

        rows.into_iter()
            .map(|row| {
                let id: i64 = row.try_get("id")?;
                let guesses = by_game.remove(&id).unwrap_or_default();
                Self::row_to_record(row, guesses)
            })
            .collect()
    }

    fn row_to_record(row: SqliteRow, guesses: Vec<i64>) -> Result<GameRecord, GuessError> {
        let id: i64 = row.try_get("id")?;
        let secret: i64 = row.try_get("secret")?;
        let completed_i: i64 = row.try_get("completed")?;
        let completed_at: Option<String> = row.try_get("completed_at")?;
        let username: String = row.try_get("username")?;

        let completed_at = completed_at.as_deref().map(parse_timestamp).transpose()?;

        Ok(GameRecord {
            id,
            secret,
            completed: completed_i != 0,
            completed_at,
            username,
            guesses,
        })
    }
}

async fn insert_game<'e, E>(exec: E, secret: i64, account_id: i64) -> Result<Game, GuessError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("INSERT INTO game (secret, completed, account_id) VALUES (?, 0, ?)")
        .bind(secret)
        .bind(account_id)
        .execute(exec)
        .await;

    match res {
        Ok(done) => {
            let id = done.last_insert_rowid();
            debug!(id, account_id, "game started");
            Ok(Game {
                id,
                secret,
                completed: false,
                completed_at: None,
                account_id,
            })
        }
        Err(e) if is_foreign_key_violation(&e) => Err(GuessError::account_not_found(account_id)),
        Err(e) => Err(e.into()),
    }
}

async fn write_completion<'e, E>(exec: E, game: &Game) -> Result<(), GuessError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let completed_i = if game.completed { 1 } else { 0 };
    let completed_at = game.completed_at.map(|t| t.to_rfc3339());
    let done = sqlx::query("UPDATE game SET completed = ?, completed_at = ? WHERE id = ?")
        .bind(completed_i)
        .bind(completed_at)
        .bind(game.id)
        .execute(exec)
        .await?;

    if done.rows_affected() == 0 {
        return Err(GuessError::game_not_found(game.id));
    }
    debug!(id = game.id, completed = game.completed, "game updated");
    Ok(())
}

async fn insert_guess<'e, E>(
    exec: E,
    game_id: i64,
    value: i64,
    time: i64,
) -> Result<Guess, GuessError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("INSERT INTO guess (game_id, value, time) VALUES (?, ?, ?)")
        .bind(game_id)
        .bind(value)
        .bind(time)
        .execute(exec)
        .await;

    match res {
        Ok(_) => Ok(Guess {
            game_id,
            value,
            time,
        }),
        Err(e) if is_foreign_key_violation(&e) => Err(GuessError::game_not_found(game_id)),
        Err(e) => Err(e.into()),
    }
}


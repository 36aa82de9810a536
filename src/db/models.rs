use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Public view of an account. The password hash never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct AccountRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
    pub id: i64,
    pub secret: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub account_id: i64,
}

impl Game {
    /// Mark the game finished at `at`. Persist with `GuessStore::update_game`.
    pub fn complete(mut self, at: DateTime<Utc>) -> Self {
        self.completed = true;
        self.completed_at = Some(at);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guess {
    pub game_id: i64,
    pub value: i64,
    /// Epoch milliseconds.
    pub time: i64,
}

/// A finished round as handed over by the game layer: the secret, its owner and every
/// guess in the order it was made.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewGame {
    pub secret: i64,
    pub account_id: i64,
    pub guesses: Vec<i64>,
}

/// Read model: a game joined with its owner's username and its ordered guesses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameRecord {
    pub id: i64,
    pub secret: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub username: String,
    pub guesses: Vec<i64>,
}

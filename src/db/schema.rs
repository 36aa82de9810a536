//! SQL DDL for the game store.

/// SQLite schema:
/// - `account.username` UNIQUE, so a repeat registration fails instead of overwriting
/// - `game.completed` INTEGER 0/1, `game.completed_at` RFC3339 text or NULL
/// - `guess.time` epoch millis; `guess` has no key of its own, ties sort by rowid
/// - both foreign keys cascade on delete (requires `PRAGMA foreign_keys = ON`)
pub(crate) const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS account (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS game (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    secret INTEGER NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT NULL,
    account_id INTEGER NOT NULL,
    FOREIGN KEY (account_id) REFERENCES account(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS guess (
    game_id INTEGER NOT NULL,
    value INTEGER NOT NULL,
    time INTEGER NOT NULL,
    FOREIGN KEY (game_id) REFERENCES game(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_game_completed ON game(completed);
CREATE INDEX IF NOT EXISTS idx_guess_game_time ON guess(game_id, time);
"#;

//! Database module: the SQLite-backed game store.
//!
//! Layout:
//! - `schema.rs`: SQL DDL run on every open
//! - `models.rs`: plain records handed to callers
//! - `sqlite.rs`: `GuessStore`, connection setup and the startup sweep
//! - `accounts.rs`: registration and password authentication
//! - `games.rs`: games, guesses and hydrated `GameRecord` reads

mod accounts;
mod games;
pub mod models;
mod schema;
mod sqlite;

pub use models::{Account, Game, GameRecord, Guess, NewGame};
pub use sqlite::{GuessStore, StoreOptions};

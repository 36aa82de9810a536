pub mod config;
pub mod db;
pub mod error;
pub mod service;

pub use db::{Account, Game, GameRecord, Guess, GuessStore, NewGame, StoreOptions};
pub use error::GuessError;
pub use service::password::{HashingOptions, PasswordService};

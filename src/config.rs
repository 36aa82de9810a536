use crate::db::StoreOptions;
use crate::service::password::HashingOptions;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Process settings, resolved from defaults plus the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the SQLite file backing the store.
    pub db_filename: String,
    pub loglevel: String,
    pub hash_timeout_secs: u64,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_filename: "guess.db".to_string(),
            loglevel: "info".to_string(),
            hash_timeout_secs: 10,
            max_connections: 5,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::raw().only(&[
            "db_filename",
            "loglevel",
            "hash_timeout_secs",
            "max_connections",
        ]))
    }

    /// Extract the config. Any variable that fails to parse is an error;
    /// nothing silently reverts to a default.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            max_connections: self.max_connections.max(1),
            hashing: HashingOptions {
                timeout: Duration::from_secs(self.hash_timeout_secs),
                ..HashingOptions::default()
            },
        }
    }
}

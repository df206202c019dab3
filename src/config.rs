//! Layered settings: built-in defaults, then an optional TOML file, then
//! `STATDASH_<SECTION>__<KEY>` environment variables.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::aggregate::Limits;
use crate::error::Result;
use crate::persist::PersistenceMode;

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "STATDASH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "statdash.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    /// `:memory:` for an in-memory store
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LimitSettings {
    pub max_tables: usize,
    /// 0 disables the time budget
    pub time_budget_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogSettings {
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub limits: LimitSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Read the file named by `STATDASH_CONFIG`, or `statdash.toml` when unset.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// A missing file is not an error; the defaults and environment still apply.
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .set_default("database.path", "zimstats.sqlite")?
            .set_default("server.bind", "127.0.0.1:8080")?
            .set_default("limits.max_tables", 256_i64)?
            .set_default("limits.time_budget_ms", 2000_i64)?
            .set_default("log.filter", "info")?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("STATDASH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        PersistenceMode::from_path(&self.database.path)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_tables: self.limits.max_tables,
            time_budget: match self.limits.time_budget_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}

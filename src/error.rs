use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatdashError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, StatdashError>;

// Helper conversions
impl From<rusqlite::Error> for StatdashError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}

impl From<config::ConfigError> for StatdashError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

impl From<std::io::Error> for StatdashError {
    fn from(e: std::io::Error) -> Self { Self::Server(e.to_string()) }
}

//! Common error types for Shinobi Roster

use thiserror::Error;

/// Common result type for Shinobi Roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the Shinobi Roster crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML config file could not be parsed
    #[error("Invalid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

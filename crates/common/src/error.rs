use thiserror::Error;

use sqlparser::parser::ParserError;

/// Unified error type for the Floe connector crates.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid filter expression: {0}")]
    Filter(#[from] ParserError),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("projection error: {0}")]
    Projection(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn projection(msg: impl Into<String>) -> Self {
        Error::Projection(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Configuration(e.to_string())
    }
}

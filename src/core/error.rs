//! Error types for guacman.
//!
//! All errors that can occur in the application are defined here.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, GuacError>;

/// All errors that can occur in the guacman application.
#[derive(Error, Debug)]
pub enum GuacError {
    /// No connection with the given ID exists in the store.
    #[error("Connection {0} not found")]
    ConnectionNotFound(i32),

    /// The protocol value is not one this tool knows how to provision.
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// A CSV row is missing a column its protocol requires.
    #[error("Row {line}: missing required column '{column}'")]
    MissingColumn { line: u64, column: &'static str },

    /// A port value could not be parsed as a TCP port number.
    #[error("Invalid port value: {0}")]
    InvalidPort(String),

    /// The config file named on the command line does not exist.
    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    /// Opening the database session failed.
    #[error("Error connecting to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// A statement failed inside an open session; the surrounding
    /// transaction has been rolled back.
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    /// CSV read/parse error for the import file itself.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GuacError {
    /// Process exit code for this failure kind.
    ///
    /// 1 = statement/IO failure, 2 = connection or configuration failure,
    /// 3 = delete target not found, 4 = unusable import input.
    pub fn exit_code(&self) -> i32 {
        match self {
            GuacError::ConnectionNotFound(_) => 3,
            GuacError::Connect(_)
            | GuacError::InvalidPort(_)
            | GuacError::ConfigFileNotFound(_) => 2,
            GuacError::Csv(_)
            | GuacError::UnsupportedProtocol(_)
            | GuacError::MissingColumn { .. } => 4,
            GuacError::Db(_) | GuacError::Io(_) | GuacError::Json(_) => 1,
        }
    }
}

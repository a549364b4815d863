//! Error types for humn-story
//!
//! Media failures are absorbed by the playback engine
//! (see `playback::media::MediaError`) and never surface here.

use thiserror::Error;

/// Main error type for humn-story
#[derive(Error, Debug)]
pub enum Error {
    /// Story catalog failed validation
    #[error("Invalid catalog: {0}")]
    Catalog(String),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] humn_common::Error),

    /// Unrecognized rehearsal command
    #[error("Unknown command: {0}")]
    Command(String),

    /// Terminal I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using humn-story Error
pub type Result<T> = std::result::Result<T, Error>;

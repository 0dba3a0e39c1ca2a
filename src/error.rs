//! Error types for the photo organizer

use crate::validate::NameViolation;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo organizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the photo organizer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid destination name for {path}: {violation}")]
    NameValidation {
        path: PathBuf,
        violation: NameViolation,
    },

    #[error("Content comparison failed between {source_path} and {existing}: {message}")]
    Comparison {
        source_path: PathBuf,
        existing: PathBuf,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Organizer worker stopped unexpectedly: {0}")]
    Worker(String),
}

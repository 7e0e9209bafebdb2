//! Storage error types.
//!
//! [`PersistenceError`] fails a persist call; [`DeliveryError`] never does (it is folded into
//! the report outcome).

use std::path::PathBuf;

use thiserror::Error;

/// Errors writing the conversation JSON or the CSV summary.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to save JSON file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to save CSV file: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors sending the email report.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Invalid address: {0}")]
    Address(String),
    #[error("Failed to build email: {0}")]
    Build(String),
    #[error("Failed to read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to send email: {0}")]
    Smtp(String),
}

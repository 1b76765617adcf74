//! Errors raised while writing conversion output.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to read template {path}: {message}")]
    Template { path: PathBuf, message: String },
    #[error("Template has no sheet named '{0}'")]
    MissingSheet(String),
    #[error("Failed to create sheet '{0}': {1}")]
    Sheet(String, String),
    #[error("Failed to write workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

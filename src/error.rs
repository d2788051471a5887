//! Error types for the migration engine.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] globset::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Tree-sitter parse error for {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Tree-sitter query error: {0}")]
    Query(#[from] tree_sitter::QueryError),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("No files matched the specified criteria")]
    NoFilesMatched,

    #[error("Overlapping edits at byte {at} in planned change")]
    OverlappingEdits { at: usize },
}

/// A specialized Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

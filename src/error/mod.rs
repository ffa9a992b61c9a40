//! # Error Module
//!
//! Error types for the photo organizer.
//!
//! ## Design Principles
//! - **Never abort a batch** because of one bad photo - per-file problems are
//!   collected and reported, not propagated
//! - **Include context** - paths, file names, what went wrong
//! - **User-friendly messages** - non-technical users should understand

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Analysis error: {0}")]
    Analyze(#[from] AnalyzeError),

    #[error("Naming error: {0}")]
    Naming(#[from] NamingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Execution error: {0}")]
    Execute(#[from] ExecuteError),
}

/// Errors that occur while discovering photos
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source folder does not exist: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Source path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },
}

/// Errors that occur while building a photo record
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Failed to read file metadata for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path} for hashing: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No readable EXIF data in {path}: {reason}")]
    Exif { path: PathBuf, reason: String },
}

/// Errors that occur while choosing a destination name
#[derive(Error, Debug)]
pub enum NamingError {
    #[error("No free destination name for {path} after {attempts} attempts per strategy")]
    Exhausted { path: PathBuf, attempts: usize },
}

/// Errors in user-supplied configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid filename pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Errors that stop the move/copy phase before it starts
#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("Failed to create destination folder {path}: {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Nothing to execute: the run had no destination folder")]
    NoPlan,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;

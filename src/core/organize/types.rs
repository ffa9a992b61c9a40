//! Types for the organize module.

use crate::core::record::RecordId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Date folder layout under the destination root
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FolderStructure {
    /// Year/Month/Day (e.g., 2024/01/15/)
    #[default]
    YearMonthDay,
    /// Year/Month (e.g., 2024/01 - January/)
    YearMonth,
    /// Flat Year-Month (e.g., 2024-01/)
    YearMonthFlat,
}

/// What happens to the source file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Move files to destination
    #[default]
    Move,
    /// Copy files to destination (keep originals)
    Copy,
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationMode::Move => write!(f, "move"),
            OperationMode::Copy => write!(f, "copy"),
        }
    }
}

/// How the destination file name was chosen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NameStrategy {
    /// Original stem kept (sanitized)
    Preserved,
    /// Stem rebuilt from the capture time
    Timestamp,
}

/// One kept photo and where it will go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedFile {
    pub record: RecordId,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Final file name (last component of `destination`)
    pub filename: String,
    /// ISO date of the folder bucket
    pub date: String,
    pub size_bytes: u64,
    pub strategy: NameStrategy,
    /// A `_NNN` suffix or fallback name was needed
    pub has_conflict: bool,
}

impl PlannedFile {
    /// Whether the destination name differs from the source name
    pub fn is_renamed(&self) -> bool {
        self.source.file_name().and_then(|n| n.to_str()) != Some(self.filename.as_str())
    }
}

/// A record that could not be given a destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingFailure {
    pub record: RecordId,
    pub source: PathBuf,
    pub message: String,
}

/// Summary of files by year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub count: usize,
    pub size_bytes: u64,
}

/// The organization plan (preview)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizePlan {
    pub id: String,
    pub destination: PathBuf,
    pub structure: FolderStructure,
    pub files: Vec<PlannedFile>,
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub date_range: Option<(String, String)>, // (earliest, latest)
    pub by_year: Vec<YearSummary>,
    pub conflict_count: usize,
    pub renamed_count: usize,
    pub failures: Vec<NamingFailure>,
}

/// Result of executing the plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeResult {
    pub files_processed: usize,
    pub folders_created: usize,
    pub total_size_bytes: u64,
    pub duration_ms: u64,
    pub errors: Vec<String>,
}

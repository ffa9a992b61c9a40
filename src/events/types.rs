//! Event type definitions for progress reporting.

use crate::core::dedup::DetectionMethod;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the organizer pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Analysis (hash + EXIF) phase events
    Analyze(AnalyzeEvent),
    /// Duplicate detection events
    Detect(DetectEvent),
    /// File copy/move events
    Execute(ExecuteEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { paths: Vec<PathBuf> },
    /// Progress update during scanning
    Progress(ScanProgress),
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_photos: usize },
}

/// Progress information during scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of directories scanned so far
    pub directories_scanned: usize,
    /// Number of photos found so far
    pub photos_found: usize,
    /// Current directory being scanned
    pub current_path: PathBuf,
}

/// Events during the analysis phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnalyzeEvent {
    /// Analysis has started
    Started { total_photos: usize },
    /// Progress update during analysis
    Progress(AnalyzeProgress),
    /// A file could not be analyzed and was skipped
    Error { path: PathBuf, message: String },
    /// Analysis completed
    Completed {
        total_analyzed: usize,
        with_exif_date: usize,
    },
}

/// Progress information during analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeProgress {
    /// Number of photos analyzed so far
    pub completed: usize,
    /// Total number of photos to analyze
    pub total: usize,
    /// Photo just analyzed
    pub current_path: PathBuf,
}

/// Events during duplicate detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DetectEvent {
    /// Detection has started
    Started { total_records: usize },
    /// One detector finished
    StageCompleted {
        method: DetectionMethod,
        groups: usize,
        remaining: usize,
    },
    /// A detector was not run
    StageSkipped {
        method: DetectionMethod,
        reason: String,
    },
    /// Detection completed
    Completed {
        total_groups: usize,
        total_duplicates: usize,
    },
}

/// Events while copying or moving files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecuteEvent {
    /// Execution has started
    Started { total_files: usize },
    /// One file was placed
    Progress(ExecuteProgress),
    /// One file failed
    Error { path: PathBuf, message: String },
    /// Execution completed
    Completed { processed: usize, failed: usize },
}

/// Progress information during execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteProgress {
    /// Files done so far
    pub completed: usize,
    /// Total files in the plan
    pub total: usize,
    /// Destination just written
    pub current_path: PathBuf,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Analyzing,
    Detecting,
    Selecting,
    Naming,
    Executing,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total photos analyzed
    pub total_photos: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Total number of duplicate photos (excluding the kept copy)
    pub duplicate_count: usize,
    /// Photos selected for the organized library
    pub kept: usize,
    /// Bytes occupied by excluded duplicates
    pub potential_savings_bytes: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Analyzing => write!(f, "Analyzing"),
            PipelinePhase::Detecting => write!(f, "Detecting duplicates"),
            PipelinePhase::Selecting => write!(f, "Selecting best copies"),
            PipelinePhase::Naming => write!(f, "Planning names"),
            PipelinePhase::Executing => write!(f, "Organizing"),
        }
    }
}

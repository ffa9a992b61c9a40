//! # Core Module
//!
//! The photo organizing engine, independent of any front end.
//!
//! ## Modules
//! - `scanner` - Discovers photos in directories
//! - `analyzer` - Hashes files and reads EXIF capture data
//! - `record` - Per-photo records and the arena that owns them
//! - `dedup` - Hash, capture-time and filename duplicate detection
//! - `selector` - Picks the copy to keep from each duplicate group
//! - `organize` - Collision-safe naming, planning and file placement
//! - `pipeline` - Orchestrates the full workflow

pub mod analyzer;
pub mod dedup;
pub mod organize;
pub mod pipeline;
pub mod record;
pub mod scanner;
pub mod selector;

// Re-export commonly used types
pub use dedup::{DetectionConfig, DetectionMethod, DuplicateGroup, DuplicatePartition};
pub use organize::{FolderStructure, OperationMode, OrganizePlan, OrganizeResult};
pub use record::{DateSource, PhotoRecord, RecordId, RecordStore};
pub use selector::{KeepReason, QualitySelector, Selection};

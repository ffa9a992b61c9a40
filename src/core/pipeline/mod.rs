//! # Pipeline Module
//!
//! Orchestrates the full organize workflow.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover photos in the source directories
//! 2. **Analyze** - Hash contents and read EXIF (parallel, rayon)
//! 3. **Detect** - Hash, capture-time and filename duplicate cascade
//! 4. **Select** - Keep the best copy of each duplicate group
//! 5. **Name** - Date folders and collision-free file names
//! 6. **Execute** - Move or copy (skipped for dry runs)
//!
//! Stages 3 to 5 are single-threaded over an immutable record snapshot.

mod config;
mod executor;

pub use config::PipelineConfig;
pub use executor::{Pipeline, PipelineBuilder, PipelineResult};

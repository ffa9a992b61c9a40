//! # Photo Organizer
//!
//! Consolidates a messy photo folder into one dated library, keeping a
//! single copy of every photo.
//!
//! ## Pipeline
//! 1. Scan source folders for image files
//! 2. Analyze each file (content hash, EXIF capture date, camera)
//! 3. Detect duplicates: exact bytes, then capture time, then filename
//! 4. Keep the best copy of each duplicate group
//! 5. Name and place the kept photos in date folders, never overwriting
//!
//! ## Architecture
//! - `core` - The scanning, detection and organizing engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types for every stage

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug output when
/// `verbose` is on. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

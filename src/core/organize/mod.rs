//! # Organize Module
//!
//! Turns the keep-set into a dated folder tree with collision-free names.
//!
//! - [`OrganizePlanner`] assigns each kept record a date folder and asks the
//!   [`NameResolver`] for a unique file name
//! - [`OrganizeExecutor`] creates folders and moves or copies the files

mod executor;
mod namer;
mod planner;
mod types;

pub use executor::OrganizeExecutor;
pub use namer::{
    timestamp_stem, NamePolicy, NameResolver, NamingConfig, ResolvedName,
    DEFAULT_DESCRIPTIVE_KEYWORDS, DEFAULT_MAX_STEM_LENGTH, DEFAULT_NON_MEANINGFUL_PATTERNS,
    DEFAULT_SUFFIX_ATTEMPT_LIMIT,
};
pub use planner::OrganizePlanner;
pub use types::*;

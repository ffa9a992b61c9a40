//! Pipeline configuration.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "detection": { "large_dataset_threshold": 20000 },
//!   "naming": { "descriptive_keywords": ["hike", "party"] },
//!   "operation": "copy"
//! }
//! ```

use crate::core::dedup::DetectionConfig;
use crate::core::organize::{FolderStructure, NamingConfig, OperationMode};
use crate::core::scanner::ScanConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directories to scan
    pub sources: Vec<PathBuf>,
    /// Root of the organized library; no plan is built without it
    pub destination: Option<PathBuf>,
    pub detection: DetectionConfig,
    pub naming: NamingConfig,
    pub scan: ScanConfig,
    pub folder_structure: FolderStructure,
    pub operation: OperationMode,
}

impl PipelineConfig {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("organizer.json");
        std::fs::write(
            &path,
            r#"{ "detection": { "large_dataset_threshold": 10 }, "operation": "copy" }"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();

        assert_eq!(config.detection.large_dataset_threshold, 10);
        assert_eq!(config.detection.filename_similarity_suffixes.len(), 8);
        assert_eq!(config.operation, OperationMode::Copy);
        assert_eq!(config.folder_structure, FolderStructure::YearMonthDay);
        assert_eq!(config.naming.suffix_attempt_limit, 9999);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            PipelineConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            PipelineConfig::from_file(Path::new("/nonexistent/organizer.json")),
            Err(ConfigError::Read { .. })
        ));
    }
}

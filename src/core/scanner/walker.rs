//! Directory walking implementation using walkdir.

use super::{filter::ImageFilter, PhotoScanner, ScanResult};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent, ScanProgress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions);
        }

        Self { config, filter }
    }

    /// Fail fast on a root that cannot be scanned
    pub fn validate_root(root: &Path) -> Result<(), ScanError> {
        if !root.exists() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Hidden directories below the root are pruned, not just skipped
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        entry.depth() == 0 || self.filter.includes_hidden() || !ImageFilter::is_hidden(entry.path())
    }

    /// Scan a single directory
    fn scan_directory(
        &self,
        root: &Path,
        found: &mut BTreeSet<PathBuf>,
        errors: &mut Vec<ScanError>,
        events: &EventSender,
    ) {
        let mut directories_scanned = 0;

        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry_result in walker.into_iter().filter_entry(|e| self.keep_entry(e)) {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if entry.file_type().is_dir() {
                        directories_scanned += 1;
                        events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                            directories_scanned,
                            photos_found: found.len(),
                            current_path: path.to_path_buf(),
                        })));
                        continue;
                    }

                    if self.filter.should_include(path) {
                        found.insert(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::Walk {
                            path: path.clone(),
                            reason: e.to_string(),
                        }
                    };

                    warn!("{}", error);
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        debug!(
            "Scanned {} directories under {}",
            directories_scanned,
            root.display()
        );
    }
}

impl PhotoScanner for WalkDirScanner {
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanResult, ScanError> {
        self.scan_with_events(paths, &null_sender())
    }

    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        for path in paths {
            Self::validate_root(path)?;
        }

        events.send(Event::Scan(ScanEvent::Started {
            paths: paths.to_vec(),
        }));

        let mut found = BTreeSet::new();
        let mut errors = Vec::new();
        for path in paths {
            self.scan_directory(path, &mut found, &mut errors, events);
        }

        info!("Found {} photo files", found.len());
        events.send(Event::Scan(ScanEvent::Completed {
            total_photos: found.len(),
        }));

        Ok(ScanResult {
            files: found.into_iter().collect(),
            errors,
        })
    }
}

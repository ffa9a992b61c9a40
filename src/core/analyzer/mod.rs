//! # Analyzer Module
//!
//! Builds a [`PhotoRecord`] per file: size and mtime, a content hash, and
//! EXIF fields with the capture date and camera.
//!
//! Files are analyzed in parallel with rayon. A file whose hash or EXIF
//! cannot be read still yields a record; only a file that cannot even be
//! stat'ed is dropped (it could not be moved either).

mod exif;
mod hash;

pub use exif::{parse_exif_datetime, read_exif, ExifSummary};
pub use hash::{content_hash, hash_bytes, read_file_bytes, FileBytes};

use crate::core::record::{DateSource, PhotoRecord, RecordStore};
use crate::error::AnalyzeError;
use crate::events::{AnalyzeEvent, AnalyzeProgress, Event, EventSender};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Records for every analyzable file, in input order
#[derive(Debug, Default)]
pub struct AnalysisResult {
    pub store: RecordStore,
    /// Files dropped because they could not be stat'ed
    pub errors: Vec<AnalyzeError>,
    /// Records without a content hash
    pub unhashed: usize,
}

/// Analyze one photo
pub fn analyze_photo(path: &Path) -> Result<PhotoRecord, AnalyzeError> {
    let metadata = std::fs::metadata(path).map_err(|source| AnalyzeError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    let mut record = PhotoRecord::new(path, metadata.len(), mtime);

    match content_hash(path) {
        Ok(hash) => record = record.with_hash(hash),
        Err(e) => warn!("Failed to calculate hash for {}: {}", path.display(), e),
    }

    match read_exif(path) {
        Ok(summary) => {
            record.exif_fields = summary.fields;
            record.camera_make = summary.camera_make;
            record.camera_model = summary.camera_model;
            if let Some(date) = summary.date_taken {
                record = record.with_date_taken(date);
            }
        }
        Err(e) => debug!("{}", e),
    }

    if record.date_source == DateSource::Mtime {
        debug!("No EXIF date found for {}, using file mtime", path.display());
    }

    Ok(record)
}

/// Analyze many photos in parallel, keeping input order
pub fn analyze_all(paths: &[PathBuf], events: &EventSender) -> AnalysisResult {
    let total = paths.len();
    events.send(Event::Analyze(AnalyzeEvent::Started {
        total_photos: total,
    }));

    let completed = AtomicUsize::new(0);
    let outcomes: Vec<Result<PhotoRecord, AnalyzeError>> = paths
        .par_iter()
        .map(|path| {
            let outcome = analyze_photo(path);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            events.send(Event::Analyze(AnalyzeEvent::Progress(AnalyzeProgress {
                completed: done,
                total,
                current_path: path.clone(),
            })));
            outcome
        })
        .collect();

    let mut result = AnalysisResult::default();
    for outcome in outcomes {
        match outcome {
            Ok(record) => {
                if record.content_hash.is_none() {
                    result.unhashed += 1;
                }
                result.store.push(record);
            }
            Err(e) => {
                warn!("Skipping {}", e);
                if let AnalyzeError::Metadata { path, .. } = &e {
                    events.send(Event::Analyze(AnalyzeEvent::Error {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                }
                result.errors.push(e);
            }
        }
    }

    let with_exif_date = result
        .store
        .iter()
        .filter(|(_, r)| r.date_source == DateSource::Exif)
        .count();
    info!(
        "Analyzed {} photos ({} with EXIF dates, {} unhashed, {} skipped)",
        result.store.len(),
        with_exif_date,
        result.unhashed,
        result.errors.len()
    );
    events.send(Event::Analyze(AnalyzeEvent::Completed {
        total_analyzed: result.store.len(),
        with_exif_date,
    }));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::null_sender;
    use tempfile::TempDir;

    #[test]
    fn plain_file_falls_back_to_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("IMG_0001.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        let record = analyze_photo(&path).unwrap();

        assert_eq!(record.size, 4);
        assert!(record.content_hash.is_some());
        assert!(record.exif_fields.is_empty());
        assert_eq!(record.date_source, DateSource::Mtime);
        assert!(record.camera_make.is_none());
    }

    #[test]
    fn missing_file_is_a_metadata_error() {
        let err = analyze_photo(Path::new("/nonexistent/a.jpg")).unwrap_err();
        assert!(matches!(err, AnalyzeError::Metadata { .. }));
    }

    #[test]
    fn analyze_all_keeps_input_order_and_skips_missing() {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..8 {
            let path = dir.path().join(format!("p{i}.jpg"));
            std::fs::write(&path, format!("photo {i}")).unwrap();
            paths.push(path);
        }
        paths.insert(3, dir.path().join("gone.jpg"));

        let result = analyze_all(&paths, &null_sender());

        assert_eq!(result.store.len(), 8);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.unhashed, 0);
        let names: Vec<&str> = result.store.iter().map(|(_, r)| r.file_name()).collect();
        assert_eq!(
            names,
            vec!["p0.jpg", "p1.jpg", "p2.jpg", "p3.jpg", "p4.jpg", "p5.jpg", "p6.jpg", "p7.jpg"]
        );
    }
}

//! Near-duplicate detection by capture time and camera.
//!
//! The same shutter event re-encoded by other software (a thumbnail, an
//! edited export) keeps its capture timestamp and camera tags even when
//! the bytes and the file size change.

use super::{bucket_by, Cluster, DetectionMethod, Grouper};
use crate::core::record::{DateSource, RecordId, RecordStore};

/// Groups records by (capture second, camera make, camera model)
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalGrouper {
    /// Ignore records whose date is only a modification time
    exif_only: bool,
}

impl TemporalGrouper {
    pub fn new(exif_only: bool) -> Self {
        Self { exif_only }
    }
}

impl Grouper for TemporalGrouper {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Exif
    }

    fn group(&self, store: &RecordStore, candidates: &[RecordId]) -> Vec<Cluster> {
        bucket_by(
            candidates,
            |id| {
                let record = &store[id];
                if self.exif_only && record.date_source != DateSource::Exif {
                    return None;
                }
                Some((
                    record.capture_second(),
                    record.camera_make.as_deref(),
                    record.camera_model.as_deref(),
                ))
            },
            |(when, make, model)| {
                format!(
                    "{} {} {}",
                    when.format("%Y-%m-%d %H:%M:%S"),
                    make.unwrap_or("-"),
                    model.unwrap_or("-")
                )
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::PhotoRecord;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::time::SystemTime;

    fn at(h: u32, m: u32, s: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .and_hms_milli_opt(h, m, s, milli)
            .unwrap()
    }

    fn push(store: &mut RecordStore, path: &str, when: NaiveDateTime, model: &str) -> RecordId {
        store.push(
            PhotoRecord::new(path, 10, SystemTime::UNIX_EPOCH)
                .with_date_taken(when)
                .with_camera(Some("Google"), Some(model)),
        )
    }

    #[test]
    fn same_second_and_camera_group_together() {
        let mut store = RecordStore::new();
        let a = push(&mut store, "/a.jpg", at(10, 0, 0, 0), "Pixel 7");
        let b = push(&mut store, "/b.jpg", at(10, 0, 0, 0), "Pixel 7");
        let c = push(&mut store, "/c.jpg", at(10, 0, 0, 0), "Pixel 6");

        let clusters = TemporalGrouper::new(false).group(&store, &[a, b, c]);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![a, b]);
        assert!(clusters[0].key.contains("Pixel 7"));
    }

    #[test]
    fn subseconds_are_truncated() {
        let mut store = RecordStore::new();
        let a = push(&mut store, "/a.jpg", at(10, 0, 5, 100), "Pixel 7");
        let b = push(&mut store, "/b.jpg", at(10, 0, 5, 900), "Pixel 7");

        let clusters = TemporalGrouper::new(false).group(&store, &[a, b]);

        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn different_seconds_do_not_group() {
        let mut store = RecordStore::new();
        let a = push(&mut store, "/a.jpg", at(10, 0, 5, 0), "Pixel 7");
        let b = push(&mut store, "/b.jpg", at(10, 0, 6, 0), "Pixel 7");

        assert!(TemporalGrouper::new(false).group(&store, &[a, b]).is_empty());
    }

    #[test]
    fn missing_camera_is_part_of_the_key() {
        let mut store = RecordStore::new();
        let when = at(9, 30, 0, 0);
        let a = store.push(PhotoRecord::new("/a.jpg", 1, SystemTime::UNIX_EPOCH).with_date_taken(when));
        let b = store.push(PhotoRecord::new("/b.jpg", 1, SystemTime::UNIX_EPOCH).with_date_taken(when));

        let clusters = TemporalGrouper::new(false).group(&store, &[a, b]);

        assert_eq!(clusters.len(), 1);
        assert!(clusters[0].key.contains("- -"));
    }

    #[test]
    fn exif_only_ignores_mtime_dates() {
        let mut store = RecordStore::new();
        let a = store.push(PhotoRecord::new("/a.jpg", 1, SystemTime::UNIX_EPOCH));
        let b = store.push(PhotoRecord::new("/b.jpg", 2, SystemTime::UNIX_EPOCH));

        assert_eq!(TemporalGrouper::new(false).group(&store, &[a, b]).len(), 1);
        assert!(TemporalGrouper::new(true).group(&store, &[a, b]).is_empty());
    }
}

//! Exact-duplicate detection by content hash.

use super::{bucket_by, Cluster, DetectionMethod, Grouper};
use crate::core::record::{RecordId, RecordStore};

/// Groups records whose file bytes hash identically.
///
/// Records without a hash (hashing failed) are never grouped here.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashGrouper;

impl HashGrouper {
    pub fn new() -> Self {
        Self
    }
}

impl Grouper for HashGrouper {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Hash
    }

    fn group(&self, store: &RecordStore, candidates: &[RecordId]) -> Vec<Cluster> {
        bucket_by(
            candidates,
            |id| {
                store[id]
                    .content_hash
                    .as_deref()
                    .filter(|hash| !hash.is_empty())
            },
            |hash| hash.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::PhotoRecord;
    use std::time::SystemTime;

    fn push(store: &mut RecordStore, path: &str, hash: Option<&str>) -> RecordId {
        let mut record = PhotoRecord::new(path, 10, SystemTime::UNIX_EPOCH);
        record.content_hash = hash.map(str::to_string);
        store.push(record)
    }

    #[test]
    fn identical_hashes_form_a_group() {
        let mut store = RecordStore::new();
        let a = push(&mut store, "/a.jpg", Some("abc123"));
        let b = push(&mut store, "/b.jpg", Some("abc123"));
        let c = push(&mut store, "/c.jpg", Some("fff000"));

        let clusters = HashGrouper::new().group(&store, &[a, b, c]);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].key, "abc123");
        assert_eq!(clusters[0].members, vec![a, b]);
    }

    #[test]
    fn missing_and_empty_hashes_fall_through() {
        let mut store = RecordStore::new();
        let a = push(&mut store, "/a.jpg", None);
        let b = push(&mut store, "/b.jpg", None);
        let c = push(&mut store, "/c.jpg", Some(""));
        let d = push(&mut store, "/d.jpg", Some(""));

        let clusters = HashGrouper::new().group(&store, &[a, b, c, d]);

        assert!(clusters.is_empty());
    }

    #[test]
    fn only_candidates_are_considered() {
        let mut store = RecordStore::new();
        let a = push(&mut store, "/a.jpg", Some("same"));
        let _b = push(&mut store, "/b.jpg", Some("same"));

        assert!(HashGrouper::new().group(&store, &[a]).is_empty());
    }
}

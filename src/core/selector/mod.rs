//! # Selector Module
//!
//! Picks the copy to keep from every duplicate group.
//!
//! Ranking (best first):
//! 1. Larger file size (less compression)
//! 2. More non-empty EXIF fields (re-exports usually strip metadata)
//! 3. Lexically smaller path, so exact ties are still deterministic

use crate::core::dedup::{DuplicateGroup, DuplicatePartition};
use crate::core::record::{RecordId, RecordStore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Why a group's winner beat the runner-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepReason {
    /// Largest file in the group
    LargestFileSize,
    /// Same size, more EXIF metadata
    MostMetadata,
    /// Tied on size and metadata; first by path
    FirstByPath,
}

impl std::fmt::Display for KeepReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeepReason::LargestFileSize => write!(f, "Largest file size (best quality)"),
            KeepReason::MostMetadata => write!(f, "Most complete metadata"),
            KeepReason::FirstByPath => write!(f, "First by path (exact tie)"),
        }
    }
}

/// The kept record of one group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupWinner {
    pub group_id: String,
    pub keep: RecordId,
    pub reason: KeepReason,
    /// The other members, in ranking order
    pub excluded: Vec<RecordId>,
}

/// Keep/exclude decision for a whole batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    /// One winner per group plus every ungrouped record
    pub keep: BTreeSet<RecordId>,
    /// Every group member that lost
    pub exclude: BTreeSet<RecordId>,
    /// Per-group decisions in group order
    pub winners: Vec<GroupWinner>,
}

impl Selection {
    pub fn is_kept(&self, id: RecordId) -> bool {
        self.keep.contains(&id)
    }

    pub fn is_excluded(&self, id: RecordId) -> bool {
        self.exclude.contains(&id)
    }

    /// Bytes that would not be copied to the destination
    pub fn excluded_size_bytes(&self, store: &RecordStore) -> u64 {
        self.exclude.iter().map(|&id| store[id].size).sum()
    }

    /// Kept records in input order
    pub fn kept_in_order(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.keep.iter().copied()
    }
}

/// Ranks duplicate candidates by size and metadata completeness
#[derive(Debug, Clone, Copy, Default)]
pub struct QualitySelector;

impl QualitySelector {
    pub fn new() -> Self {
        Self
    }

    /// Order two records best-first
    pub fn compare(&self, store: &RecordStore, a: RecordId, b: RecordId) -> Ordering {
        let (ra, rb) = (&store[a], &store[b]);
        rb.size
            .cmp(&ra.size)
            .then_with(|| rb.exif_field_count().cmp(&ra.exif_field_count()))
            .then_with(|| ra.path.cmp(&rb.path))
    }

    /// Members of a group sorted best-first
    pub fn rank(&self, store: &RecordStore, members: &[RecordId]) -> Vec<RecordId> {
        let mut ranked = members.to_vec();
        ranked.sort_by(|&a, &b| self.compare(store, a, b));
        ranked
    }

    /// Pick the record to keep.
    ///
    /// # Panics
    /// If `members` is empty. The coordinator only produces groups of two or
    /// more, so an empty group means a caller broke that contract.
    pub fn select_best(&self, store: &RecordStore, members: &[RecordId]) -> (RecordId, KeepReason) {
        assert!(
            !members.is_empty(),
            "QualitySelector::select_best called with an empty group"
        );

        let ranked = self.rank(store, members);
        let best = ranked[0];
        let reason = match ranked.get(1) {
            Some(&runner_up) => Self::reason(store, best, runner_up),
            None => KeepReason::LargestFileSize,
        };
        (best, reason)
    }

    /// Keep one record per group and every ungrouped record
    pub fn select(&self, store: &RecordStore, partition: &DuplicatePartition) -> Selection {
        let mut selection = Selection::default();
        selection.keep.extend(partition.ungrouped().iter().copied());

        for group in partition.groups() {
            let winner = self.select_group(store, group);
            selection.keep.insert(winner.keep);
            selection.exclude.extend(winner.excluded.iter().copied());
            selection.winners.push(winner);
        }

        info!(
            "Selected {} unique photos from {} total ({} duplicates to exclude)",
            selection.keep.len(),
            store.len(),
            selection.exclude.len()
        );
        selection
    }

    fn select_group(&self, store: &RecordStore, group: &DuplicateGroup) -> GroupWinner {
        let (keep, reason) = self.select_best(store, &group.members);
        let excluded: Vec<RecordId> = self
            .rank(store, &group.members)
            .into_iter()
            .filter(|&id| id != keep)
            .collect();

        let best = &store[keep];
        debug!(
            "Selected best photo from {} duplicates in {}: {} (size={}, exif_fields={}, {})",
            group.len(),
            group.id,
            best.file_name(),
            best.size,
            best.exif_field_count(),
            reason
        );

        GroupWinner {
            group_id: group.id.clone(),
            keep,
            reason,
            excluded,
        }
    }

    fn reason(store: &RecordStore, best: RecordId, runner_up: RecordId) -> KeepReason {
        let (a, b) = (&store[best], &store[runner_up]);
        if a.size != b.size {
            KeepReason::LargestFileSize
        } else if a.exif_field_count() != b.exif_field_count() {
            KeepReason::MostMetadata
        } else {
            KeepReason::FirstByPath
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dedup::DuplicateCoordinator;
    use crate::core::record::PhotoRecord;
    use std::time::{Duration, SystemTime};

    fn record(path: &str, size: u64) -> PhotoRecord {
        PhotoRecord::new(path, size, SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn larger_file_wins() {
        let mut store = RecordStore::new();
        let small = store.push(record("/a.jpg", 4_000_000));
        let large = store.push(record("/b.jpg", 5_000_000));

        let (best, reason) = QualitySelector::new().select_best(&store, &[small, large]);

        assert_eq!(best, large);
        assert_eq!(reason, KeepReason::LargestFileSize);
    }

    #[test]
    fn exif_count_breaks_size_ties() {
        let mut store = RecordStore::new();
        let stripped = store.push(record("/a.jpg", 100).with_exif_field("Make", "Canon"));
        let original = store.push(
            record("/b.jpg", 100)
                .with_exif_field("Make", "Canon")
                .with_exif_field("Model", "R5")
                .with_exif_field("FNumber", "f/2.8"),
        );

        let (best, reason) = QualitySelector::new().select_best(&store, &[stripped, original]);

        assert_eq!(best, original);
        assert_eq!(reason, KeepReason::MostMetadata);
    }

    #[test]
    fn exact_ties_fall_back_to_path_order() {
        let mut store = RecordStore::new();
        let z = store.push(record("/z/photo.jpg", 100));
        let a = store.push(record("/a/photo.jpg", 100));

        let selector = QualitySelector::new();
        assert_eq!(selector.select_best(&store, &[z, a]), (a, KeepReason::FirstByPath));
        assert_eq!(selector.select_best(&store, &[a, z]), (a, KeepReason::FirstByPath));
    }

    #[test]
    fn rank_orders_best_first() {
        let mut store = RecordStore::new();
        let a = store.push(record("/a.jpg", 10));
        let b = store.push(record("/b.jpg", 30));
        let c = store.push(record("/c.jpg", 20));

        assert_eq!(QualitySelector::new().rank(&store, &[a, b, c]), vec![b, c, a]);
    }

    #[test]
    #[should_panic(expected = "empty group")]
    fn empty_group_is_a_contract_violation() {
        let store = RecordStore::new();
        QualitySelector::new().select_best(&store, &[]);
    }

    #[test]
    fn keeps_five_megabyte_copy_of_hash_group() {
        let mut store = RecordStore::new();
        let big = store.push(record("/a.jpg", 5 * 1024 * 1024).with_hash("abc123def"));
        let small = store.push(
            PhotoRecord::new("/b.jpg", 4 * 1024 * 1024, SystemTime::UNIX_EPOCH + Duration::from_secs(7200))
                .with_hash("abc123def"),
        );

        let partition = DuplicateCoordinator::default().detect(&store);
        let selection = QualitySelector::new().select(&store, &partition);

        assert!(selection.is_kept(big));
        assert!(selection.is_excluded(small));
        assert_eq!(selection.excluded_size_bytes(&store), 4 * 1024 * 1024);
        assert_eq!(selection.winners[0].group_id, "hash_abc123de");
    }

    #[test]
    fn keep_and_exclude_cover_the_batch() {
        let mut store = RecordStore::new();
        for i in 0..6u64 {
            let hash = if i < 3 { "triple".to_string() } else { format!("unique{i}") };
            store.push(
                PhotoRecord::new(
                    format!("/lib/shot_{i}.jpg"),
                    100 + i,
                    SystemTime::UNIX_EPOCH + Duration::from_secs(3600 * (i + 1)),
                )
                .with_hash(hash),
            );
        }

        let partition = DuplicateCoordinator::default().detect(&store);
        let selection = QualitySelector::new().select(&store, &partition);

        assert!(selection.keep.is_disjoint(&selection.exclude));
        assert_eq!(selection.keep.len() + selection.exclude.len(), store.len());
        assert_eq!(
            selection.keep.len(),
            partition.ungrouped().len() + partition.groups().len()
        );
    }
}

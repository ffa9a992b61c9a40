//! # Dedup Module
//!
//! Finds duplicate photos with three detectors of decreasing strength.
//!
//! ## Detection Cascade
//! | Order | Detector | Evidence |
//! |-------|----------|----------|
//! | 1 | [`HashGrouper`] | identical file bytes |
//! | 2 | [`TemporalGrouper`] | same capture second and camera |
//! | 3 | [`FilenameSimilarityGrouper`] | related filenames |
//!
//! Each detector only sees the records the previous ones left ungrouped,
//! so a record lands in at most one group and weaker heuristics never
//! re-classify an exact duplicate.

mod coordinator;
mod filename;
mod hash;
mod temporal;

pub use coordinator::DuplicateCoordinator;
pub use filename::{FilenameSimilarityGrouper, DEFAULT_SIMILARITY_SUFFIXES};
pub use hash::HashGrouper;
pub use temporal::TemporalGrouper;

use crate::core::record::{RecordId, RecordStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Default batch size above which the quadratic filename pass is skipped
pub const DEFAULT_LARGE_DATASET_THRESHOLD: usize = 5000;

/// Which detector produced a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Identical content hash
    Hash,
    /// Same capture time and camera
    Exif,
    /// Similar filename
    Filename,
}

impl DetectionMethod {
    /// Prefix used in synthetic group ids
    pub fn tag(&self) -> &'static str {
        match self {
            DetectionMethod::Hash => "hash",
            DetectionMethod::Exif => "exif",
            DetectionMethod::Filename => "filename",
        }
    }
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionMethod::Hash => write!(f, "Exact Match"),
            DetectionMethod::Exif => write!(f, "Same Capture Time"),
            DetectionMethod::Filename => write!(f, "Similar Filename"),
        }
    }
}

/// A set of records one detector believes are the same photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Synthetic id, e.g. `hash_1a2b3c4d`, `exif_3`, `filename_7`
    pub id: String,
    /// Detector that found the group
    pub method: DetectionMethod,
    /// What the members share (hash, capture time and camera, or stem)
    pub key: String,
    /// Members in input order, always at least two
    pub members: Vec<RecordId>,
}

impl DuplicateGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of copies beyond the one that will be kept
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.members.contains(&id)
    }
}

/// Output of a detector before the coordinator assigns ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// What the members share
    pub key: String,
    /// Members in input order
    pub members: Vec<RecordId>,
}

/// A duplicate detector.
///
/// Implementations only look at `candidates`, keep their input order, and
/// return clusters of two or more records.
pub trait Grouper {
    /// Tag for the groups this detector produces
    fn method(&self) -> DetectionMethod;

    /// Cluster the candidates
    fn group(&self, store: &RecordStore, candidates: &[RecordId]) -> Vec<Cluster>;
}

/// Partition of a batch into duplicate groups and ungrouped singles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicatePartition {
    groups: Vec<DuplicateGroup>,
    ungrouped: Vec<RecordId>,
}

impl DuplicatePartition {
    pub(crate) fn new(groups: Vec<DuplicateGroup>, ungrouped: Vec<RecordId>) -> Self {
        Self { groups, ungrouped }
    }

    /// Groups in detection order (hash, then exif, then filename)
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Records that belong to no group, in input order
    pub fn ungrouped(&self) -> &[RecordId] {
        &self.ungrouped
    }

    /// Look up a group by id
    pub fn group(&self, id: &str) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Group containing a record, if any
    pub fn group_of(&self, record: RecordId) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.contains(record))
    }

    /// Groups found by one detector
    pub fn groups_by(&self, method: DetectionMethod) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.iter().filter(move |g| g.method == method)
    }

    /// Total copies beyond one per group
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::duplicate_count).sum()
    }

    /// Number of records covered by groups and singles together
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum::<usize>() + self.ungrouped.len()
    }
}

/// Tuning for the detection cascade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Never run the filename pass
    pub skip_filename_similarity: bool,
    /// Skip the filename pass when the batch has more records than this
    pub large_dataset_threshold: usize,
    /// Trailing suffixes stripped before comparing stems, tried in order
    pub filename_similarity_suffixes: Vec<String>,
    /// Only group by capture time when the time came from EXIF
    pub temporal_exif_only: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            skip_filename_similarity: false,
            large_dataset_threshold: DEFAULT_LARGE_DATASET_THRESHOLD,
            filename_similarity_suffixes: DEFAULT_SIMILARITY_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            temporal_exif_only: false,
        }
    }
}

/// Bucket candidates by an equality key, keeping first-seen bucket order.
///
/// Candidates whose key is `None` are left out. Only buckets with two or
/// more members are returned.
pub(crate) fn bucket_by<K, F, L>(candidates: &[RecordId], key_of: F, label: L) -> Vec<Cluster>
where
    K: Eq + Hash,
    F: Fn(RecordId) -> Option<K>,
    L: Fn(&K) -> String,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<RecordId>)> = Vec::new();

    for &id in candidates {
        let Some(key) = key_of(id) else {
            continue;
        };
        match index.get(&key) {
            Some(&slot) => buckets[slot].1.push(id),
            None => {
                buckets.push((label(&key), vec![id]));
                index.insert(key, buckets.len() - 1);
            }
        }
    }

    buckets
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(key, members)| Cluster { key, members })
        .collect()
}

//! Runs the detectors as a priority cascade over a shrinking candidate pool.

use super::{
    Cluster, DetectionConfig, DetectionMethod, DuplicateGroup, DuplicatePartition,
    FilenameSimilarityGrouper, Grouper, HashGrouper, TemporalGrouper,
};
use crate::core::record::{RecordId, RecordStore};
use crate::events::{null_sender, DetectEvent, Event, EventSender};
use std::collections::HashSet;
use tracing::{debug, info};

/// Characters of the content hash used in `hash_` group ids
const SHORT_HASH_LEN: usize = 8;

/// Partitions a batch into duplicate groups and ungrouped singles
#[derive(Debug, Clone)]
pub struct DuplicateCoordinator {
    config: DetectionConfig,
    hash: HashGrouper,
    temporal: TemporalGrouper,
    filename: FilenameSimilarityGrouper,
}

impl DuplicateCoordinator {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            hash: HashGrouper::new(),
            temporal: TemporalGrouper::new(config.temporal_exif_only),
            filename: FilenameSimilarityGrouper::new(&config.filename_similarity_suffixes),
            config,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Whether the filename pass runs for a batch of `total` records
    pub fn filename_pass_enabled(&self, total: usize) -> bool {
        !self.config.skip_filename_similarity && total <= self.config.large_dataset_threshold
    }

    /// Detect duplicates without progress reporting
    pub fn detect(&self, store: &RecordStore) -> DuplicatePartition {
        self.detect_with_events(store, &null_sender())
    }

    /// Detect duplicates, reporting each stage
    pub fn detect_with_events(&self, store: &RecordStore, events: &EventSender) -> DuplicatePartition {
        let total = store.len();
        events.send(Event::Detect(DetectEvent::Started {
            total_records: total,
        }));

        let mut pool: Vec<RecordId> = store.ids().collect();
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        let mut ids = GroupIds::default();

        pool = self.run_stage(&self.hash, store, pool, &mut groups, &mut ids, events);
        pool = self.run_stage(&self.temporal, store, pool, &mut groups, &mut ids, events);

        if self.filename_pass_enabled(total) {
            pool = self.run_stage(&self.filename, store, pool, &mut groups, &mut ids, events);
        } else {
            let reason = if self.config.skip_filename_similarity {
                "disabled".to_string()
            } else {
                format!(
                    "{} records exceed the large dataset threshold of {}",
                    total, self.config.large_dataset_threshold
                )
            };
            info!("Skipping filename similarity detection: {}", reason);
            events.send(Event::Detect(DetectEvent::StageSkipped {
                method: DetectionMethod::Filename,
                reason,
            }));
        }

        let partition = DuplicatePartition::new(groups, pool);
        info!(
            "Detected {} duplicate groups ({} duplicates, {} ungrouped)",
            partition.groups().len(),
            partition.duplicate_count(),
            partition.ungrouped().len()
        );
        events.send(Event::Detect(DetectEvent::Completed {
            total_groups: partition.groups().len(),
            total_duplicates: partition.duplicate_count(),
        }));

        partition
    }

    /// Run one detector over the pool and return what it left ungrouped
    fn run_stage(
        &self,
        grouper: &dyn Grouper,
        store: &RecordStore,
        pool: Vec<RecordId>,
        groups: &mut Vec<DuplicateGroup>,
        ids: &mut GroupIds,
        events: &EventSender,
    ) -> Vec<RecordId> {
        let method = grouper.method();
        let clusters = grouper.group(store, &pool);
        let mut placed: HashSet<RecordId> = HashSet::new();
        let found = clusters.len();

        for Cluster { key, members } in clusters {
            debug_assert!(members.len() >= 2, "detectors only return real groups");
            let id = ids.next(method, &key);
            debug!(
                "Found {} potential duplicates by {}: {} ({})",
                members.len(),
                method.tag(),
                id,
                key
            );
            placed.extend(members.iter().copied());
            groups.push(DuplicateGroup {
                id,
                method,
                key,
                members,
            });
        }

        let remaining: Vec<RecordId> = pool.into_iter().filter(|id| !placed.contains(id)).collect();
        events.send(Event::Detect(DetectEvent::StageCompleted {
            method,
            groups: found,
            remaining: remaining.len(),
        }));
        remaining
    }
}

impl Default for DuplicateCoordinator {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

/// Hands out synthetic group ids.
///
/// `exif_` and `filename_` ids share one running counter. `hash_` ids use the
/// hash prefix and get a `_<k>` tail if two hashes share that prefix.
#[derive(Debug, Default)]
struct GroupIds {
    counter: usize,
    used: HashSet<String>,
}

impl GroupIds {
    fn next(&mut self, method: DetectionMethod, key: &str) -> String {
        let base = match method {
            DetectionMethod::Hash => {
                let short: String = key.chars().take(SHORT_HASH_LEN).collect();
                format!("hash_{}", short)
            }
            DetectionMethod::Exif | DetectionMethod::Filename => {
                self.counter += 1;
                format!("{}_{}", method.tag(), self.counter)
            }
        };

        let mut id = base.clone();
        let mut k = 1;
        while !self.used.insert(id.clone()) {
            k += 1;
            id = format!("{}_{}", base, k);
        }
        id
    }
}

//! Pipeline execution implementation.

use super::config::PipelineConfig;
use crate::core::analyzer::analyze_all;
use crate::core::dedup::{DetectionConfig, DuplicateCoordinator, DuplicatePartition};
use crate::core::organize::{
    FolderStructure, NamePolicy, NameResolver, NamingConfig, OperationMode, OrganizeExecutor,
    OrganizePlan, OrganizePlanner, OrganizeResult,
};
use crate::core::record::RecordStore;
use crate::core::scanner::{PhotoScanner, ScanConfig, WalkDirScanner};
use crate::core::selector::{QualitySelector, Selection};
use crate::error::{ConfigError, ExecuteError, OrganizerError};
use crate::events::{
    null_sender, Event, EventSender, ExecuteEvent, ExecuteProgress, PipelineEvent, PipelinePhase,
    PipelineSummary,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Every analyzed photo
    pub store: RecordStore,
    /// Duplicate groups and ungrouped singles
    pub partition: DuplicatePartition,
    /// Keep/exclude decision
    pub selection: Selection,
    /// Destinations for kept photos (only when a destination is configured)
    pub plan: Option<OrganizePlan>,
    /// Non-fatal problems (unreadable files, walk errors, naming failures)
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn total_photos(&self) -> usize {
        self.store.len()
    }

    pub fn duplicate_count(&self) -> usize {
        self.selection.exclude.len()
    }

    /// Bytes of the excluded copies
    pub fn potential_savings_bytes(&self) -> u64 {
        self.selection.excluded_size_bytes(&self.store)
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            total_photos: self.total_photos(),
            duplicate_groups: self.partition.groups().len(),
            duplicate_count: self.duplicate_count(),
            kept: self.selection.keep.len(),
            potential_savings_bytes: self.potential_savings_bytes(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Start from a loaded configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Directories to scan
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.sources = paths;
        self
    }

    /// Root of the organized library
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.config.destination = Some(destination.into());
        self
    }

    pub fn folder_structure(mut self, structure: FolderStructure) -> Self {
        self.config.folder_structure = structure;
        self
    }

    pub fn operation(mut self, operation: OperationMode) -> Self {
        self.config.operation = operation;
        self
    }

    pub fn detection(mut self, detection: DetectionConfig) -> Self {
        self.config.detection = detection;
        self
    }

    pub fn naming(mut self, naming: NamingConfig) -> Self {
        self.config.naming = naming;
        self
    }

    /// Never run the filename similarity pass
    pub fn skip_filename_similarity(mut self, skip: bool) -> Self {
        self.config.detection.skip_filename_similarity = skip;
        self
    }

    /// Skip the filename pass above this many photos
    pub fn large_dataset_threshold(mut self, threshold: usize) -> Self {
        self.config.detection.large_dataset_threshold = threshold;
        self
    }

    /// Only group by capture time when it came from EXIF
    pub fn temporal_exif_only(mut self, exif_only: bool) -> Self {
        self.config.detection.temporal_exif_only = exif_only;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan = config;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan.include_hidden = include;
        self
    }

    /// Build the pipeline, compiling the naming patterns
    pub fn build(self) -> Result<Pipeline, ConfigError> {
        if self.config.naming.suffix_attempt_limit == 0 {
            return Err(ConfigError::Invalid(
                "suffix_attempt_limit must be at least 1".to_string(),
            ));
        }
        let policy = NamePolicy::from_config(&self.config.naming)?;

        Ok(Pipeline {
            coordinator: DuplicateCoordinator::new(self.config.detection.clone()),
            selector: QualitySelector::new(),
            policy,
            config: self.config,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The organize pipeline
pub struct Pipeline {
    config: PipelineConfig,
    coordinator: DuplicateCoordinator,
    selector: QualitySelector,
    policy: NamePolicy,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, OrganizerError> {
        self.run_with_events(&null_sender())
    }

    /// Scan, analyze, detect, select and plan. Nothing on disk is changed.
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, OrganizerError> {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        Self::phase(events, PipelinePhase::Scanning);
        let scanner = WalkDirScanner::new(self.config.scan.clone());
        let scan_result = match scanner.scan_with_events(&self.config.sources, events) {
            Ok(result) => result,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };
        errors.extend(scan_result.errors.iter().map(ToString::to_string));

        Self::phase(events, PipelinePhase::Analyzing);
        let analysis = analyze_all(&scan_result.files, events);
        errors.extend(analysis.errors.iter().map(ToString::to_string));

        let mut result = self.process_with_events(analysis.store, events);
        errors.append(&mut result.errors);
        result.errors = errors;
        result.duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: result.summary(),
        }));
        Ok(result)
    }

    /// Detect, select and plan over records that are already analyzed
    pub fn process(&self, store: RecordStore) -> PipelineResult {
        self.process_with_events(store, &null_sender())
    }

    fn process_with_events(&self, store: RecordStore, events: &EventSender) -> PipelineResult {
        let start_time = Instant::now();

        Self::phase(events, PipelinePhase::Detecting);
        let partition = self.coordinator.detect_with_events(&store, events);

        Self::phase(events, PipelinePhase::Selecting);
        let selection = self.selector.select(&store, &partition);

        let mut errors = Vec::new();
        let plan = self.config.destination.as_ref().map(|destination| {
            Self::phase(events, PipelinePhase::Naming);
            let mut resolver =
                NameResolver::new(self.policy.clone(), self.config.naming.suffix_attempt_limit);
            let plan = OrganizePlanner::create_plan(
                &store,
                &selection,
                destination,
                self.config.folder_structure,
                &mut resolver,
            );
            errors.extend(plan.failures.iter().map(|f| f.message.clone()));
            plan
        });

        PipelineResult {
            store,
            partition,
            selection,
            plan,
            errors,
            duration_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    /// Carry out a planned run
    pub fn execute(&self, result: &PipelineResult) -> Result<OrganizeResult, ExecuteError> {
        self.execute_with_events(result, &null_sender())
    }

    /// Carry out a planned run, reporting each file
    pub fn execute_with_events(
        &self,
        result: &PipelineResult,
        events: &EventSender,
    ) -> Result<OrganizeResult, ExecuteError> {
        let plan = result.plan.as_ref().ok_or(ExecuteError::NoPlan)?;

        Self::phase(events, PipelinePhase::Executing);
        events.send(Event::Execute(ExecuteEvent::Started {
            total_files: plan.total_files,
        }));

        let outcome = OrganizeExecutor::execute(plan, self.config.operation, |done, total, path| {
            events.send(Event::Execute(ExecuteEvent::Progress(ExecuteProgress {
                completed: done,
                total,
                current_path: path.to_path_buf(),
            })));
        })?;

        for error in &outcome.errors {
            events.send(Event::Execute(ExecuteEvent::Error {
                path: plan.destination.clone(),
                message: error.clone(),
            }));
        }
        events.send(Event::Execute(ExecuteEvent::Completed {
            processed: outcome.files_processed,
            failed: outcome.errors.len(),
        }));

        info!(
            "{} {} photos, {} folders created",
            match self.config.operation {
                OperationMode::Move => "Moved",
                OperationMode::Copy => "Copied",
            },
            outcome.files_processed,
            outcome.folders_created
        );
        Ok(outcome)
    }

    fn phase(events: &EventSender, phase: PipelinePhase) {
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::PhotoRecord;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn builder_applies_detection_flags() {
        let pipeline = Pipeline::builder()
            .paths(vec![PathBuf::from("/photos")])
            .skip_filename_similarity(true)
            .large_dataset_threshold(10)
            .build()
            .unwrap();

        assert!(pipeline.config().detection.skip_filename_similarity);
        assert_eq!(pipeline.config().detection.large_dataset_threshold, 10);
    }

    #[test]
    fn builder_rejects_bad_patterns() {
        let naming = NamingConfig {
            non_meaningful_patterns: vec!["[".to_string()],
            ..NamingConfig::default()
        };
        assert!(matches!(
            Pipeline::builder().naming(naming).build(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn pipeline_handles_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let pipeline = Pipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .build()
            .unwrap();
        let result = pipeline.run().unwrap();

        assert_eq!(result.total_photos(), 0);
        assert!(result.partition.groups().is_empty());
        assert!(result.plan.is_none());
    }

    #[test]
    fn missing_source_is_fatal() {
        let pipeline = Pipeline::builder()
            .paths(vec![PathBuf::from("/nonexistent/photos/98765")])
            .build()
            .unwrap();

        assert!(matches!(pipeline.run(), Err(OrganizerError::Scan(_))));
    }

    #[test]
    fn process_plans_kept_records() {
        let mut store = RecordStore::new();
        store.push(PhotoRecord::new("/in/a.jpg", 5, SystemTime::UNIX_EPOCH).with_hash("x"));
        store.push(
            PhotoRecord::new("/in/b.jpg", 3, SystemTime::UNIX_EPOCH + Duration::from_secs(60))
                .with_hash("x"),
        );

        let pipeline = Pipeline::builder().destination("/out").build().unwrap();
        let result = pipeline.process(store);

        assert_eq!(result.duplicate_count(), 1);
        assert_eq!(result.potential_savings_bytes(), 3);
        let plan = result.plan.as_ref().unwrap();
        assert_eq!(plan.total_files, 1);
        assert_eq!(plan.files[0].source, PathBuf::from("/in/a.jpg"));
    }

    #[test]
    fn execute_without_destination_is_an_error() {
        let pipeline = Pipeline::builder().build().unwrap();
        let result = pipeline.process(RecordStore::new());

        assert!(matches!(pipeline.execute(&result), Err(ExecuteError::NoPlan)));
    }

    #[test]
    fn run_and_execute_copies_one_of_each_duplicate() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(source.path().join("beach_sunset.jpg"), b"identical").unwrap();
        fs::create_dir(source.path().join("backup")).unwrap();
        fs::write(source.path().join("backup/beach_sunset.jpg"), b"identical").unwrap();

        let pipeline = Pipeline::builder()
            .paths(vec![source.path().to_path_buf()])
            .destination(dest.path())
            .operation(OperationMode::Copy)
            .build()
            .unwrap();

        let result = pipeline.run().unwrap();
        assert_eq!(result.total_photos(), 2);
        assert_eq!(result.partition.groups().len(), 1);

        let outcome = pipeline.execute(&result).unwrap();
        assert_eq!(outcome.files_processed, 1);
        assert!(outcome.errors.is_empty());
        let placed = &result.plan.as_ref().unwrap().files[0].destination;
        assert!(placed.exists());
        assert!(placed.ends_with("beach_sunset.jpg"));
    }
}

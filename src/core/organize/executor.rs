//! Executor for organization plans.

use super::types::*;
use crate::error::ExecuteError;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Executes organization plans
pub struct OrganizeExecutor;

impl OrganizeExecutor {
    /// Copy or move every planned file, reporting progress as `(done, total, destination)`.
    ///
    /// Only a destination root that cannot be created is fatal. Per-file
    /// failures are collected in [`OrganizeResult::errors`].
    pub fn execute<F>(
        plan: &OrganizePlan,
        operation: OperationMode,
        mut on_progress: F,
    ) -> Result<OrganizeResult, ExecuteError>
    where
        F: FnMut(usize, usize, &Path),
    {
        let start = Instant::now();
        let mut last_progress: Option<Instant> = None;

        fs::create_dir_all(&plan.destination).map_err(|source| ExecuteError::CreateDestination {
            path: plan.destination.clone(),
            source,
        })?;

        let mut result = OrganizeResult::default();
        let mut created_dirs: HashSet<PathBuf> = HashSet::new();

        for (i, file) in plan.files.iter().enumerate() {
            let now = Instant::now();
            if last_progress.map_or(true, |t| now.duration_since(t) >= PROGRESS_INTERVAL) {
                on_progress(i + 1, plan.total_files, &file.destination);
                last_progress = Some(now);
            }

            if let Some(parent) = file.destination.parent() {
                if !created_dirs.contains(parent) {
                    let existed = parent.is_dir();
                    if let Err(e) = fs::create_dir_all(parent) {
                        warn!("Failed to create {}: {}", parent.display(), e);
                        result
                            .errors
                            .push(format!("Failed to create {}: {}", parent.display(), e));
                        continue;
                    }
                    created_dirs.insert(parent.to_path_buf());
                    if !existed {
                        result.folders_created += 1;
                    }
                }
            }

            match Self::place(&file.source, &file.destination, operation) {
                Ok(()) => {
                    debug!("{} {} -> {}", operation, file.source.display(), file.destination.display());
                    result.files_processed += 1;
                    result.total_size_bytes += file.size_bytes;
                }
                Err(e) => {
                    warn!("Failed to {} {}: {}", operation, file.source.display(), e);
                    result.errors.push(format!("{}: {}", file.source.display(), e));
                }
            }
        }

        on_progress(plan.total_files, plan.total_files, &plan.destination);
        result.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Organized {} of {} photos into {} ({} errors)",
            result.files_processed,
            plan.total_files,
            plan.destination.display(),
            result.errors.len()
        );
        Ok(result)
    }

    fn place(source: &Path, dest: &Path, operation: OperationMode) -> io::Result<()> {
        if !source.exists() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "source file not found"));
        }
        if dest.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination already exists: {}", dest.display()),
            ));
        }

        match operation {
            OperationMode::Copy => fs::copy(source, dest).map(|_| ()),
            // rename fails across filesystems
            OperationMode::Move => fs::rename(source, dest).or_else(|_| Self::copy_then_delete(source, dest)),
        }
    }

    /// Copy, verify the size, then delete the source
    fn copy_then_delete(source: &Path, dest: &Path) -> io::Result<()> {
        let source_size = fs::metadata(source)?.len();
        fs::copy(source, dest)?;

        let dest_size = fs::metadata(dest)?.len();
        if dest_size != source_size {
            let _ = fs::remove_file(dest);
            return Err(io::Error::other(format!(
                "copy verification failed: source {} bytes, dest {} bytes",
                source_size, dest_size
            )));
        }

        fs::remove_file(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::RecordStore;
    use std::io::Write;
    use tempfile::TempDir;

    fn single_file_plan(source: PathBuf, destination_root: &Path, relative: &str) -> OrganizePlan {
        let mut store = RecordStore::new();
        let record = store.push(crate::core::record::PhotoRecord::new(
            &source,
            12,
            std::time::SystemTime::UNIX_EPOCH,
        ));
        let destination = destination_root.join(relative);
        OrganizePlan {
            id: "test".to_string(),
            destination: destination_root.to_path_buf(),
            structure: FolderStructure::YearMonthDay,
            files: vec![PlannedFile {
                record,
                filename: destination
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned(),
                source,
                destination,
                date: "2024-01-15".to_string(),
                size_bytes: 12,
                strategy: NameStrategy::Preserved,
                has_conflict: false,
            }],
            total_files: 1,
            total_size_bytes: 12,
            date_range: None,
            by_year: vec![],
            conflict_count: 0,
            renamed_count: 0,
            failures: vec![],
        }
    }

    fn write_source(dir: &TempDir) -> PathBuf {
        let src_file = dir.path().join("test.jpg");
        let mut f = fs::File::create(&src_file).unwrap();
        f.write_all(b"test content").unwrap();
        src_file
    }

    #[test]
    fn copy_keeps_original() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let src_file = write_source(&temp_src);

        let plan = single_file_plan(src_file.clone(), temp_dest.path(), "2024/01/15/test.jpg");
        let result = OrganizeExecutor::execute(&plan, OperationMode::Copy, |_, _, _| {}).unwrap();

        assert_eq!(result.files_processed, 1);
        assert_eq!(result.folders_created, 1);
        assert!(src_file.exists());
        assert!(temp_dest.path().join("2024/01/15/test.jpg").exists());
    }

    #[test]
    fn move_removes_original() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let src_file = write_source(&temp_src);

        let plan = single_file_plan(src_file.clone(), temp_dest.path(), "2024/01/15/renamed.jpg");
        let result = OrganizeExecutor::execute(&plan, OperationMode::Move, |_, _, _| {}).unwrap();

        assert_eq!(result.files_processed, 1);
        assert!(!src_file.exists());
        let moved = temp_dest.path().join("2024/01/15/renamed.jpg");
        assert_eq!(fs::read(moved).unwrap(), b"test content");
    }

    #[test]
    fn missing_source_is_a_file_error() {
        let temp_dest = TempDir::new().unwrap();

        let plan = single_file_plan(PathBuf::from("/nonexistent/file.jpg"), temp_dest.path(), "2024/file.jpg");
        let result = OrganizeExecutor::execute(&plan, OperationMode::Copy, |_, _, _| {}).unwrap();

        assert_eq!(result.files_processed, 0);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn existing_destination_is_not_overwritten() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let src_file = write_source(&temp_src);
        let existing = temp_dest.path().join("test.jpg");
        fs::write(&existing, b"keep me").unwrap();

        let plan = single_file_plan(src_file.clone(), temp_dest.path(), "test.jpg");
        let result = OrganizeExecutor::execute(&plan, OperationMode::Move, |_, _, _| {}).unwrap();

        assert_eq!(result.files_processed, 0);
        assert_eq!(result.errors.len(), 1);
        assert!(src_file.exists());
        assert_eq!(fs::read(existing).unwrap(), b"keep me");
    }

    #[test]
    fn progress_reaches_total() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let src_file = write_source(&temp_src);

        let plan = single_file_plan(src_file, temp_dest.path(), "a/test.jpg");
        let mut last = (0, 0);
        OrganizeExecutor::execute(&plan, OperationMode::Copy, |done, total, _| last = (done, total)).unwrap();

        assert_eq!(last, (1, 1));
    }
}

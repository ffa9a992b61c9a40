//! Plan generator for organization operations.

use super::namer::NameResolver;
use super::types::*;
use crate::core::record::RecordStore;
use crate::core::selector::Selection;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Generates organization plans
pub struct OrganizePlanner;

impl OrganizePlanner {
    /// Assign every kept record a date folder and a unique file name.
    ///
    /// Records whose name cannot be resolved are listed in
    /// [`OrganizePlan::failures`] and left out of the plan.
    pub fn create_plan(
        store: &RecordStore,
        selection: &Selection,
        destination: &Path,
        structure: FolderStructure,
        resolver: &mut NameResolver,
    ) -> OrganizePlan {
        let mut files = Vec::with_capacity(selection.keep.len());
        let mut failures = Vec::new();
        let mut by_year: BTreeMap<i32, (usize, u64)> = BTreeMap::new();
        let mut earliest: Option<NaiveDate> = None;
        let mut latest: Option<NaiveDate> = None;
        let mut total_size = 0u64;
        let mut conflict_count = 0;

        for id in selection.kept_in_order() {
            let record = &store[id];
            let date = record.date_taken.date();
            let folder = destination.join(Self::folder_for(structure, date));

            let resolved = match resolver.resolve(record, &folder) {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!("{}", e);
                    failures.push(NamingFailure {
                        record: id,
                        source: record.path.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            earliest = Some(earliest.map_or(date, |e| e.min(date)));
            latest = Some(latest.map_or(date, |l| l.max(date)));
            let entry = by_year.entry(date.year()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += record.size;
            total_size += record.size;
            if resolved.collided {
                conflict_count += 1;
            }

            files.push(PlannedFile {
                record: id,
                source: record.path.clone(),
                destination: resolved.path,
                filename: resolved.file_name,
                date: date.to_string(),
                size_bytes: record.size,
                strategy: resolved.strategy,
                has_conflict: resolved.collided,
            });
        }

        let renamed_count = files.iter().filter(|f| f.is_renamed()).count();
        info!(
            "Generated names for {} photos ({} renamed, {} conflicts, {} failed)",
            files.len(),
            renamed_count,
            conflict_count,
            failures.len()
        );

        let by_year = by_year
            .into_iter()
            .rev()
            .map(|(year, (count, size))| YearSummary {
                year,
                count,
                size_bytes: size,
            })
            .collect();

        let date_range = match (earliest, latest) {
            (Some(e), Some(l)) => Some((e.to_string(), l.to_string())),
            _ => None,
        };

        OrganizePlan {
            id: Uuid::new_v4().to_string(),
            destination: destination.to_path_buf(),
            structure,
            total_files: files.len(),
            total_size_bytes: total_size,
            date_range,
            by_year,
            conflict_count,
            renamed_count,
            failures,
            files,
        }
    }

    /// Folder for a date, relative to the destination root
    pub fn folder_for(structure: FolderStructure, date: NaiveDate) -> PathBuf {
        let year = date.year();
        let month = date.month();

        match structure {
            FolderStructure::YearMonthDay => [
                year.to_string(),
                format!("{:02}", month),
                format!("{:02}", date.day()),
            ]
            .iter()
            .collect(),
            FolderStructure::YearMonth => {
                let month_name = match month {
                    1 => "January",
                    2 => "February",
                    3 => "March",
                    4 => "April",
                    5 => "May",
                    6 => "June",
                    7 => "July",
                    8 => "August",
                    9 => "September",
                    10 => "October",
                    11 => "November",
                    12 => "December",
                    _ => "Unknown",
                };
                [year.to_string(), format!("{:02} - {}", month, month_name)]
                    .iter()
                    .collect()
            }
            FolderStructure::YearMonthFlat => PathBuf::from(format!("{}-{:02}", year, month)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dedup::DuplicateCoordinator;
    use crate::core::organize::namer::NamingConfig;
    use crate::core::record::PhotoRecord;
    use crate::core::selector::QualitySelector;
    use std::collections::HashSet;
    use std::time::{Duration, SystemTime};

    fn resolver() -> NameResolver {
        NameResolver::from_config(&NamingConfig::default()).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn folder_year_month_day() {
        let path = OrganizePlanner::folder_for(FolderStructure::YearMonthDay, day(2024, 1, 15));
        assert_eq!(path, Path::new("2024").join("01").join("15"));
    }

    #[test]
    fn folder_year_month() {
        let path = OrganizePlanner::folder_for(FolderStructure::YearMonth, day(2024, 12, 25));
        assert_eq!(path, Path::new("2024").join("12 - December"));
    }

    #[test]
    fn folder_flat() {
        let path = OrganizePlanner::folder_for(FolderStructure::YearMonthFlat, day(2024, 1, 15));
        assert_eq!(path, PathBuf::from("2024-01"));
    }

    #[test]
    fn plan_places_only_kept_records() {
        let mut store = RecordStore::new();
        let when = day(2023, 6, 1).and_hms_opt(10, 0, 0).unwrap();
        store.push(
            PhotoRecord::new("/src/IMG_0042.jpg", 500, SystemTime::UNIX_EPOCH)
                .with_hash("aaaa")
                .with_date_taken(when),
        );
        store.push(
            PhotoRecord::new("/src/copy/IMG_0042.jpg", 400, SystemTime::UNIX_EPOCH)
                .with_hash("aaaa")
                .with_date_taken(when),
        );
        store.push(
            PhotoRecord::new(
                "/src/Wedding_Reception.jpg",
                300,
                SystemTime::UNIX_EPOCH + Duration::from_secs(86_400 * 400),
            )
            .with_hash("bbbb"),
        );

        let partition = DuplicateCoordinator::default().detect(&store);
        let selection = QualitySelector::new().select(&store, &partition);
        let plan = OrganizePlanner::create_plan(
            &store,
            &selection,
            Path::new("/dest"),
            FolderStructure::YearMonthDay,
            &mut resolver(),
        );

        assert_eq!(plan.total_files, 2);
        assert_eq!(plan.total_size_bytes, 800);
        assert_eq!(
            plan.files[0].destination,
            Path::new("/dest/2023/06/01").join("2023-06-01_10-00-00.jpg")
        );
        assert_eq!(plan.files[0].strategy, NameStrategy::Timestamp);
        assert_eq!(plan.files[1].filename, "Wedding_Reception.jpg");
        assert_eq!(plan.renamed_count, 1);
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn plan_destinations_are_unique() {
        let mut store = RecordStore::new();
        let when = day(2023, 6, 1).and_hms_opt(10, 0, 0).unwrap();
        for i in 0..20u64 {
            // Different cameras so the temporal pass leaves them apart
            let model = format!("Model {i}");
            store.push(
                PhotoRecord::new(format!("/src/{i}/IMG_{i}.jpg"), 100 + i, SystemTime::UNIX_EPOCH)
                    .with_hash(format!("h{i}"))
                    .with_date_taken(when)
                    .with_camera(Some("Acme"), Some(model.as_str())),
            );
        }

        let coordinator = DuplicateCoordinator::new(crate::core::dedup::DetectionConfig {
            skip_filename_similarity: true,
            ..Default::default()
        });
        let partition = coordinator.detect(&store);
        let selection = QualitySelector::new().select(&store, &partition);
        let plan = OrganizePlanner::create_plan(
            &store,
            &selection,
            Path::new("/dest"),
            FolderStructure::YearMonthDay,
            &mut resolver(),
        );

        let unique: HashSet<&PathBuf> = plan.files.iter().map(|f| &f.destination).collect();
        assert_eq!(plan.files.len(), 20);
        assert_eq!(unique.len(), 20);
        assert_eq!(plan.conflict_count, 19);
        assert_eq!(plan.files[1].filename, "2023-06-01_10-00-00_001.jpg");
    }

    #[test]
    fn naming_failures_are_reported_not_fatal() {
        let mut store = RecordStore::new();
        let when = day(2023, 6, 1).and_hms_opt(10, 0, 0).unwrap();
        for i in 0..3u64 {
            let model = format!("Model {i}");
            store.push(
                PhotoRecord::new(format!("/src/{i}/IMG_1.jpg"), 10, SystemTime::UNIX_EPOCH)
                    .with_hash(format!("h{i}"))
                    .with_date_taken(when)
                    .with_camera(None, Some(model.as_str())),
            );
        }
        let partition = DuplicateCoordinator::new(crate::core::dedup::DetectionConfig {
            skip_filename_similarity: true,
            ..Default::default()
        })
        .detect(&store);
        let selection = QualitySelector::new().select(&store, &partition);
        let mut tight = NameResolver::from_config(&NamingConfig {
            suffix_attempt_limit: 1,
            ..NamingConfig::default()
        })
        .unwrap();

        let plan = OrganizePlanner::create_plan(
            &store,
            &selection,
            Path::new("/dest"),
            FolderStructure::YearMonthDay,
            &mut tight,
        );

        assert_eq!(plan.files.len(), 2);
        assert_eq!(plan.failures.len(), 1);
        assert_eq!(plan.failures[0].source, PathBuf::from("/src/2/IMG_1.jpg"));
    }
}

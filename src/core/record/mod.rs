//! # Record Module
//!
//! Immutable per-file facts shared by every stage of the pipeline.
//!
//! Records live in a [`RecordStore`] arena and are addressed by [`RecordId`].
//! Groupings, selections and name mappings are keyed by `RecordId`, so two
//! files with identical contents are still two distinct photos.

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Stable handle for a record within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(usize);

impl RecordId {
    /// Position of the record in its store (input order)
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a record's `date_taken` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Parsed from an EXIF date tag
    Exif,
    /// File modification time (no usable EXIF date)
    Mtime,
}

/// Everything the organizer knows about one photo file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Source path, unique within a run
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time
    pub mtime: SystemTime,
    /// Hex digest of the file bytes, absent if hashing failed
    pub content_hash: Option<String>,
    /// EXIF tag name to display value (primary image only)
    pub exif_fields: BTreeMap<String, String>,
    /// Capture time, or the modification time when EXIF has none
    pub date_taken: NaiveDateTime,
    /// Whether `date_taken` is a real capture time
    pub date_source: DateSource,
    /// Camera make (e.g., "Google")
    pub camera_make: Option<String>,
    /// Camera model (e.g., "Pixel 7")
    pub camera_model: Option<String>,
}

impl PhotoRecord {
    /// Create a record from filesystem facts alone.
    ///
    /// `date_taken` starts out as the modification time in local time.
    pub fn new(path: impl Into<PathBuf>, size: u64, mtime: SystemTime) -> Self {
        Self {
            path: path.into(),
            size,
            mtime,
            content_hash: None,
            exif_fields: BTreeMap::new(),
            date_taken: local_naive(mtime),
            date_source: DateSource::Mtime,
            camera_make: None,
            camera_model: None,
        }
    }

    /// Set the content hash
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    /// Set the EXIF capture time
    pub fn with_date_taken(mut self, date: NaiveDateTime) -> Self {
        self.date_taken = date;
        self.date_source = DateSource::Exif;
        self
    }

    /// Set camera make and model
    pub fn with_camera(mut self, make: Option<&str>, model: Option<&str>) -> Self {
        self.camera_make = make.map(str::to_string);
        self.camera_model = model.map(str::to_string);
        self
    }

    /// Add one EXIF field
    pub fn with_exif_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.exif_fields.insert(key.into(), value.into());
        self
    }

    /// File name without extension
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// Full file name
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// Lower-cased extension with its leading dot, or empty
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default()
    }

    /// Number of EXIF fields with a non-blank value
    pub fn exif_field_count(&self) -> usize {
        self.exif_fields
            .values()
            .filter(|v| !v.trim().is_empty())
            .count()
    }

    /// Capture time truncated to whole seconds
    pub fn capture_second(&self) -> NaiveDateTime {
        self.date_taken.with_nanosecond(0).unwrap_or(self.date_taken)
    }
}

/// Convert a filesystem timestamp to a naive local date-time
pub fn local_naive(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

/// Arena owning every record of a run
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<PhotoRecord>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record and return its handle
    pub fn push(&mut self, record: PhotoRecord) -> RecordId {
        self.records.push(record);
        RecordId(self.records.len() - 1)
    }

    /// Look up a record
    pub fn get(&self, id: RecordId) -> Option<&PhotoRecord> {
        self.records.get(id.0)
    }

    /// All handles in input order
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        (0..self.records.len()).map(RecordId)
    }

    /// All records with their handles, in input order
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &PhotoRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (RecordId(i), r))
    }

    /// Find the handle for a source path
    pub fn find(&self, path: &Path) -> Option<RecordId> {
        self.records.iter().position(|r| r.path == path).map(RecordId)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Index<RecordId> for RecordStore {
    type Output = PhotoRecord;

    fn index(&self, id: RecordId) -> &PhotoRecord {
        &self.records[id.0]
    }
}

impl FromIterator<PhotoRecord> for RecordStore {
    fn from_iter<I: IntoIterator<Item = PhotoRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

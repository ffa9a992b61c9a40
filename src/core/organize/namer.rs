//! Destination file names.
//!
//! Camera-style names (`IMG_0042`, `DSC01234`, bare dates) are replaced by the
//! capture time; anything that looks human-chosen is kept. Every name handed
//! out by a [`NameResolver`] is unique for the run.

use super::types::NameStrategy;
use crate::core::record::PhotoRecord;
use crate::error::{ConfigError, NamingError};
use chrono::NaiveDateTime;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Camera and device naming schemes, matched case-insensitively at the start
pub const DEFAULT_NON_MEANINGFUL_PATTERNS: &[&str] = &[
    r"^IMG_\d+",
    r"^DSC\d+",
    r"^DSC_\d+",
    r"^DSCN\d+",
    r"^P\d{8}",
    r"^VID_\d+",
    r"^SAM_\d+",
    r"^Screenshot",
    r"^Photo\s*\d+",
    r"^Image\s*\d+",
    r"^pic\.\d+",
    r"^Picture\s*\d+",
];

pub const DEFAULT_DESCRIPTIVE_KEYWORDS: &[&str] = &[
    "photo", "picture", "image", "event", "trip", "vacation", "birthday", "wedding",
];

pub const DEFAULT_MAX_STEM_LENGTH: usize = 200;
pub const DEFAULT_SUFFIX_ATTEMPT_LIMIT: usize = 9999;

/// Stems shorter than this are never kept
const MIN_MEANINGFUL_LEN: usize = 5;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

static LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}[-_ ]?\d{2}[-_ ]?\d{2}").expect("date pattern is valid")
});

/// Naming rules, as loaded from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Regexes for camera-generated stems
    pub non_meaningful_patterns: Vec<String>,
    /// Words that mark a stem as descriptive
    pub descriptive_keywords: Vec<String>,
    /// Longest stem kept after sanitizing, in characters
    pub max_path_length: usize,
    /// Suffix probes per naming strategy before giving up
    pub suffix_attempt_limit: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            non_meaningful_patterns: DEFAULT_NON_MEANINGFUL_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            descriptive_keywords: DEFAULT_DESCRIPTIVE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_path_length: DEFAULT_MAX_STEM_LENGTH,
            suffix_attempt_limit: DEFAULT_SUFFIX_ATTEMPT_LIMIT,
        }
    }
}

/// Compiled naming rules
#[derive(Debug, Clone)]
pub struct NamePolicy {
    patterns: Vec<Regex>,
    keywords: Vec<String>,
    max_len: usize,
}

impl NamePolicy {
    /// Compile the configured patterns
    pub fn from_config(config: &NamingConfig) -> Result<Self, ConfigError> {
        let patterns = config
            .non_meaningful_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ConfigError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if config.max_path_length == 0 {
            return Err(ConfigError::Invalid(
                "max_path_length must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            patterns,
            keywords: config
                .descriptive_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            max_len: config.max_path_length,
        })
    }

    /// Whether a stem is worth keeping as the destination name
    pub fn is_meaningful(&self, stem: &str) -> bool {
        let lower = stem.to_lowercase();

        if self.patterns.iter().any(|p| p.is_match(&lower)) {
            return false;
        }

        if stem.chars().count() < MIN_MEANINGFUL_LEN {
            return false;
        }

        let spaced = lower.replace(['_', '-'], " ");
        if LEADING_DATE.is_match(&spaced) {
            return false;
        }

        if self.keywords.iter().any(|k| spaced.contains(k.as_str())) {
            return true;
        }

        // No camera pattern matched
        true
    }

    /// Make a stem safe on common filesystems
    pub fn sanitize(&self, stem: &str) -> String {
        let replaced: String = stem
            .chars()
            .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
            .collect();
        replaced
            .trim_matches(|c| c == '.' || c == ' ')
            .chars()
            .take(self.max_len)
            .collect()
    }

    /// Preferred stem for a record before any collision handling
    pub fn choose_stem(&self, record: &PhotoRecord) -> (String, NameStrategy) {
        let stem = record.stem();
        if self.is_meaningful(stem) {
            let sanitized = self.sanitize(stem);
            if !sanitized.is_empty() {
                return (sanitized, NameStrategy::Preserved);
            }
        }
        (timestamp_stem(record.date_taken), NameStrategy::Timestamp)
    }
}

impl Default for NamePolicy {
    fn default() -> Self {
        let config = NamingConfig::default();
        Self {
            patterns: DEFAULT_NON_MEANINGFUL_PATTERNS
                .iter()
                .filter_map(|p| RegexBuilder::new(p).case_insensitive(true).build().ok())
                .collect(),
            keywords: config.descriptive_keywords,
            max_len: config.max_path_length,
        }
    }
}

/// `YYYY-MM-DD_HH-MM-SS`
pub fn timestamp_stem(date: NaiveDateTime) -> String {
    date.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// A unique destination chosen for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub path: PathBuf,
    pub file_name: String,
    pub strategy: NameStrategy,
    /// The first candidate was taken
    pub collided: bool,
}

/// Hands out collision-free destination paths for one run
#[derive(Debug)]
pub struct NameResolver {
    policy: NamePolicy,
    attempt_limit: usize,
    assigned: HashSet<String>,
    /// Next suffix to try per base path
    counters: HashMap<String, usize>,
}

impl NameResolver {
    pub fn new(policy: NamePolicy, attempt_limit: usize) -> Self {
        Self {
            policy,
            attempt_limit,
            assigned: HashSet::new(),
            counters: HashMap::new(),
        }
    }

    /// Build from configuration
    pub fn from_config(config: &NamingConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            NamePolicy::from_config(config)?,
            config.suffix_attempt_limit,
        ))
    }

    pub fn policy(&self) -> &NamePolicy {
        &self.policy
    }

    /// Number of paths handed out so far
    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    /// Choose a unique path for `record` inside `folder`
    pub fn resolve(&mut self, record: &PhotoRecord, folder: &Path) -> Result<ResolvedName, NamingError> {
        let ext = record.extension();
        let (stem, strategy) = self.policy.choose_stem(record);

        if let Some((path, collided)) = self.claim(folder, &stem, &ext) {
            return Ok(self.finish(record, path, strategy, collided));
        }

        if strategy == NameStrategy::Preserved {
            let fallback = timestamp_stem(record.date_taken);
            debug!(
                "Suffixes exhausted for {}, falling back to {}",
                record.file_name(),
                fallback
            );
            if let Some((path, _)) = self.claim(folder, &fallback, &ext) {
                return Ok(self.finish(record, path, NameStrategy::Timestamp, true));
            }
        }

        Err(NamingError::Exhausted {
            path: record.path.clone(),
            attempts: self.attempt_limit,
        })
    }

    fn finish(
        &self,
        record: &PhotoRecord,
        path: PathBuf,
        strategy: NameStrategy,
        collided: bool,
    ) -> ResolvedName {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if file_name != record.file_name() {
            debug!("Renamed: {} -> {}", record.file_name(), file_name);
        }
        ResolvedName {
            path,
            file_name,
            strategy,
            collided,
        }
    }

    /// Take `<stem><ext>` or the first free `<stem>_<NNN><ext>`
    fn claim(&mut self, folder: &Path, stem: &str, ext: &str) -> Option<(PathBuf, bool)> {
        let base = folder.join(format!("{stem}{ext}"));
        let base_key = base.to_string_lossy().into_owned();
        if self.assigned.insert(base_key.clone()) {
            return Some((base, false));
        }

        let next = self.counters.entry(base_key).or_insert(1);
        while *next <= self.attempt_limit {
            let counter = *next;
            *next += 1;
            let candidate = folder.join(format!("{stem}_{counter:03}{ext}"));
            if self.assigned.insert(candidate.to_string_lossy().into_owned()) {
                return Some((candidate, true));
            }
        }
        None
    }
}

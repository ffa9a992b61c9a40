//! Heuristic duplicate detection by filename.
//!
//! Catches copies like `IMG_1234.jpg` / `IMG_1234_edited.jpg`,
//! `DSC01234.jpg` / `DSC01234-2.jpg` and `beach day.jpg` / `beach day (1).jpg`
//! that share neither bytes nor capture metadata.
//!
//! Clustering is a single greedy pass in input order: the first unassigned
//! record opens a group and absorbs every later unassigned record similar to
//! it. Similarity is not transitive, so two records both similar to a third
//! can land in different groups depending on order. A union-find over all
//! similar pairs would remove that order dependence but would also merge
//! more photos than this pass does.

use super::{Cluster, DetectionMethod, Grouper};
use crate::core::record::{RecordId, RecordStore};
use regex::Regex;
use std::sync::LazyLock;

/// Suffixes that copies and edits commonly append to a stem
pub const DEFAULT_SIMILARITY_SUFFIXES: &[&str] =
    &["_edited", "_copy", "_1", "_2", "-1", "-2", " (1)", " (2)"];

/// Normalized stems must be longer than this to match by substring
const MIN_SUBSTRING_LEN: usize = 5;

/// Camera-style "prefix + number" stems
static NUMBERED_STEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(img_|dsc|photo|pic|image|img)(\d+)").expect("numbered stem pattern is valid")
});

/// A stem prepared for comparison
#[derive(Debug, Clone)]
struct NormalizedStem {
    text: String,
    len: usize,
    number: Option<String>,
}

/// Groups records with similar filename stems
#[derive(Debug, Clone)]
pub struct FilenameSimilarityGrouper {
    suffixes: Vec<String>,
}

impl FilenameSimilarityGrouper {
    /// Create a grouper that strips the given suffixes (matched case-insensitively)
    pub fn new(suffixes: &[String]) -> Self {
        Self {
            suffixes: suffixes.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Lower-case a stem and strip the first matching suffix
    pub fn normalize(&self, stem: &str) -> String {
        let mut base = stem.to_lowercase();
        if let Some(suffix) = self.suffixes.iter().find(|s| base.ends_with(s.as_str())) {
            base.truncate(base.len() - suffix.len());
        }
        base
    }

    /// Whether two stems look like the same photo
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        Self::matches(&self.prepare(a), &self.prepare(b))
    }

    fn prepare(&self, stem: &str) -> NormalizedStem {
        let text = self.normalize(stem);
        let number = NUMBERED_STEM
            .captures(&text)
            .and_then(|c| c.get(2))
            .map(|m| m.as_str().to_string());
        NormalizedStem {
            len: text.chars().count(),
            text,
            number,
        }
    }

    fn matches(a: &NormalizedStem, b: &NormalizedStem) -> bool {
        if let (Some(x), Some(y)) = (&a.number, &b.number) {
            return x == y;
        }

        a.len > MIN_SUBSTRING_LEN
            && b.len > MIN_SUBSTRING_LEN
            && (a.text.contains(b.text.as_str()) || b.text.contains(a.text.as_str()))
    }
}

impl Default for FilenameSimilarityGrouper {
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_SIMILARITY_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Grouper for FilenameSimilarityGrouper {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Filename
    }

    fn group(&self, store: &RecordStore, candidates: &[RecordId]) -> Vec<Cluster> {
        let stems: Vec<NormalizedStem> = candidates
            .iter()
            .map(|&id| self.prepare(store[id].stem()))
            .collect();

        let mut assigned = vec![false; candidates.len()];
        let mut clusters = Vec::new();

        for i in 0..candidates.len() {
            if assigned[i] {
                continue;
            }
            assigned[i] = true;
            let mut members = vec![candidates[i]];

            for j in (i + 1)..candidates.len() {
                if !assigned[j] && Self::matches(&stems[i], &stems[j]) {
                    assigned[j] = true;
                    members.push(candidates[j]);
                }
            }

            if members.len() >= 2 {
                clusters.push(Cluster {
                    key: store[candidates[i]].stem().to_string(),
                    members,
                });
            }
        }

        clusters
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::{Category, Entry, Metadata, Status};
use crate::error::Error;

/// The aggregate: ordered entries plus process-wide metadata.
///
/// Document order is meaningful, batches are always taken in this order.
#[derive(Debug, Clone, PartialEq)]
pub struct Encyclopedia {
    pub metadata: Metadata,
    pub entries: Vec<Entry>,
}

impl Encyclopedia {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            metadata: Metadata::new(title),
            entries: Vec::new(),
        }
    }

    pub fn with_entries(metadata: Metadata, entries: Vec<Entry>) -> Self {
        Self { metadata, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Result<&mut Entry, Error> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::UnknownEntry(id.to_string()))
    }

    /// Number of entries that carry `feature`.
    pub fn feature_count(&self, feature: &str) -> usize {
        self.entries.iter().filter(|e| e.has_feature(feature)).count()
    }

    /// Recompute `metadata.feature_counts` from the entries.
    pub fn refresh_feature_counts(&mut self) {
        let mut counts: BTreeMap<String, usize> = self
            .metadata
            .feature_counts
            .keys()
            .map(|k| (k.clone(), 0))
            .collect();
        for feature in self.entries.iter().flat_map(|e| e.processed_features.iter()) {
            *counts.entry(feature.clone()).or_insert(0) += 1;
        }
        self.metadata.feature_counts = counts;
    }

    pub fn statistics(&self) -> Statistics {
        let total_entries = self.entries.len();
        let merged_groups = self.entries.iter().filter(|e| e.synonyms.len() > 1).count();
        let total_synonyms = self.entries.iter().map(|e| e.synonyms.len()).sum();

        let mut by_category = BTreeMap::new();
        let mut by_status = BTreeMap::new();
        for entry in &self.entries {
            let category = entry.category.map(|c| c.as_str()).unwrap_or("unclassified");
            *by_category.entry(category.to_string()).or_insert(0) += 1;
            *by_status.entry(entry.status.as_str().to_string()).or_insert(0) += 1;
        }

        let compression_ratio = if total_entries > 0 {
            total_synonyms as f64 / total_entries as f64
        } else {
            0.0
        };

        Statistics {
            total_entries,
            merged_groups,
            total_synonyms,
            compression_ratio,
            by_category,
            by_status,
            feature_counts: self.metadata.feature_counts.clone(),
        }
    }

    /// Entries in `category`, in document order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(move |e| e.category == Some(category))
    }

    pub fn count_status(&self, status: Status) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

/// Aggregated counts over an [Encyclopedia].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_entries: usize,
    /// Entries that subsume more than one term.
    pub merged_groups: usize,
    pub total_synonyms: usize,
    /// Terms per entry.
    pub compression_ratio: f64,
    pub by_category: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    pub feature_counts: BTreeMap<String, usize>,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total entries: {}", self.total_entries)?;
        writeln!(f, "Merged groups: {}", self.merged_groups)?;
        writeln!(f, "Total synonyms: {}", self.total_synonyms)?;
        writeln!(f, "Terms per entry: {:.2}", self.compression_ratio)?;
        writeln!(f, "Categories:")?;
        for (category, count) in &self.by_category {
            writeln!(f, "  {category}: {count}")?;
        }
        writeln!(f, "Status:")?;
        for (status, count) in &self.by_status {
            writeln!(f, "  {status}: {count}")?;
        }
        Ok(())
    }
}

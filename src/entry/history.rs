//! Per-entry change history.
//!
//! History is append-only: records are never rewritten, and each mutation of an
//! [super::Entry] adds exactly one record while bumping the entry version by one.
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of change a [HistoryRecord] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    /// Singleton group passed through the aggregator.
    Normalized,
    Merged,
    AddedFeature,
    FeatureFailed,
    FeatureSkipped,
    Hidden,
    Unhidden,
    DisambiguationSelected,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Normalized => "normalized",
            Self::Merged => "merged",
            Self::AddedFeature => "added_feature",
            Self::FeatureFailed => "feature_failed",
            Self::FeatureSkipped => "feature_skipped",
            Self::Hidden => "hidden",
            Self::Unhidden => "unhidden",
            Self::DisambiguationSelected => "disambiguation_selected",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Changes = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub action: HistoryAction,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub changes: Changes,
}

impl HistoryRecord {
    pub fn new(version: u32, action: HistoryAction, changes: Changes) -> Self {
        Self {
            version,
            timestamp: now(),
            action,
            changes,
        }
    }
}

/// Current time, truncated to the second so that it survives an RFC 3339 round-trip.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Build a [Changes] map from key/value pairs.
pub fn changes<I, K, V>(pairs: I) -> Changes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

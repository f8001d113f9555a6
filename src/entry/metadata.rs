//! Document-level metadata, persisted once at the document root.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::{now, Changes};

/// User (or pipeline) actions logged at document level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Hide,
    Unhide,
    DisambiguationSelect,
    MergeSynonyms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: Changes,
}

/// Summary of the last batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub timestamp: DateTime<Utc>,
    pub entries_processed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_entry_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub global_version: u64,
    pub created: DateTime<Utc>,
    pub last_edited: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session: Option<Session>,
    #[serde(default)]
    pub feature_counts: BTreeMap<String, usize>,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        let created = now();
        Self {
            title: title.into(),
            global_version: 1,
            created,
            last_edited: created,
            last_session: None,
            feature_counts: BTreeMap::new(),
            actions: Vec::new(),
        }
    }

    /// Bump the global version and the edit timestamp.
    pub fn touch(&mut self) {
        self.global_version += 1;
        self.last_edited = now();
    }

    pub fn log_action(&mut self, action: ActionKind, entry_id: Option<&str>, details: Changes) {
        self.actions.push(ActionRecord {
            action,
            entry_id: entry_id.map(str::to_string),
            timestamp: now(),
            details,
        });
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new("Encyclopedia")
    }
}

//! Feature handlers and their registry.
use std::collections::BTreeMap;
use std::fmt;

use crate::entry::Entry;
use crate::error::Error;
use crate::lookup::LookupFailure;

/// Result of applying a feature to one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureOutcome {
    /// Updated copy of the entry. Only content fields are taken from it.
    Applied(Entry),
    /// Feature does not apply to this entry.
    Skipped(String),
}

/// Recoverable handler failure. The entry is reverted and retried on a later run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureError(pub String);

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LookupFailure> for FeatureError {
    fn from(e: LookupFailure) -> Self {
        FeatureError(e.to_string())
    }
}

impl From<String> for FeatureError {
    fn from(s: String) -> Self {
        FeatureError(s)
    }
}

/// A named enrichment step applied to entries in batches.
pub trait FeatureHandler {
    /// Name recorded in `processed_features`.
    fn name(&self) -> &str;
    fn apply(&self, entry: &Entry) -> Result<FeatureOutcome, FeatureError>;
}

/// Feature handlers by name.
#[derive(Default)]
pub struct FeatureRegistry {
    handlers: BTreeMap<String, Box<dyn FeatureHandler>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under its own name, replacing any previous one.
    pub fn register(&mut self, handler: Box<dyn FeatureHandler>) {
        let name = handler.name().to_string();
        if self.handlers.insert(name.clone(), handler).is_some() {
            debug!("replaced handler for feature `{}`", name);
        }
    }

    pub fn with(mut self, handler: Box<dyn FeatureHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn get(&self, name: &str) -> Result<&dyn FeatureHandler, Error> {
        self.handlers
            .get(name)
            .map(|h| h.as_ref())
            .ok_or_else(|| Error::UnknownFeature(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

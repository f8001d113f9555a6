//! Document-unique entry identifiers.
use std::collections::HashSet;

use log::warn;

use super::terms::sanitize_id;
use crate::entry::Entry;

/// Base identifier of an entry, before collision handling.
fn base_id(entry: &Entry, idx: usize) -> String {
    if let Some(id) = &entry.wikidata_id {
        return id.to_string();
    }
    let sanitized = sanitize_id(&entry.term);
    if sanitized.chars().any(|c| c != '_') {
        sanitized
    } else {
        format!("entry_{}", idx)
    }
}

/// Assign `id` to every entry, in order.
///
/// Wikidata id when present, else the sanitized term, else `entry_<idx>`.
/// Collisions get `_2`, `_3`… appended.
pub fn assign_ids(entries: &mut [Entry]) {
    let mut taken: HashSet<String> = HashSet::with_capacity(entries.len());
    for (idx, entry) in entries.iter_mut().enumerate() {
        let base = base_id(entry, idx);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while taken.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if candidate != base {
            warn!("entry id `{}` already taken, using `{}`", base, candidate);
        }
        taken.insert(candidate.clone());
        entry.id = candidate;
    }
}

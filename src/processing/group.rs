//! Grouping of raw entries by Wikidata id.
//!
//! Only identifier equality is synonym evidence: two entries with the same term
//! but no id stay apart.
use std::collections::HashMap;

use log::debug;

use crate::entry::{Entry, WikidataId};

/// Candidate synonym cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// `None` for ungrouped (identifier-less) singletons.
    pub wikidata_id: Option<WikidataId>,
    /// Store position of the first member.
    pub position: usize,
    /// Members in original store order.
    pub members: Vec<Entry>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Output of [partition].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Partition {
    /// One group per distinct id, ordered by first appearance.
    pub grouped: Vec<Group>,
    /// One singleton group per entry without id, in store order.
    pub ungrouped: Vec<Group>,
}

impl Partition {
    pub fn get(&self, id: &WikidataId) -> Option<&Group> {
        self.grouped
            .iter()
            .find(|g| g.wikidata_id.as_ref() == Some(id))
    }

    /// Total number of entries over both partitions.
    pub fn entry_count(&self) -> usize {
        self.grouped
            .iter()
            .chain(self.ungrouped.iter())
            .map(Group::len)
            .sum()
    }

    /// All groups, interleaved back into store order of their first member.
    pub fn into_ordered_groups(self) -> Vec<Group> {
        let mut groups: Vec<Group> = self.grouped.into_iter().chain(self.ungrouped).collect();
        groups.sort_by_key(|g| g.position);
        groups
    }
}

/// Partition `entries` into id groups and identifier-less singletons.
///
/// Pure: entries are moved into groups unchanged.
pub fn partition(entries: Vec<Entry>) -> Partition {
    let mut index: HashMap<WikidataId, usize> = HashMap::new();
    let mut out = Partition::default();

    for (position, entry) in entries.into_iter().enumerate() {
        match entry.wikidata_id.clone() {
            Some(id) => match index.get(&id) {
                Some(&idx) => out.grouped[idx].members.push(entry),
                None => {
                    index.insert(id.clone(), out.grouped.len());
                    out.grouped.push(Group {
                        wikidata_id: Some(id),
                        position,
                        members: vec![entry],
                    });
                }
            },
            None => out.ungrouped.push(Group {
                wikidata_id: None,
                position,
                members: vec![entry],
            }),
        }
    }

    debug!(
        "partitioned {} entries into {} id groups and {} ungrouped",
        out.entry_count(),
        out.grouped.len(),
        out.ungrouped.len()
    );
    out
}

/*! Entry processing

Normalization of a raw entry list into merged, uniquely identified entries:

- [group]: partition by Wikidata id
- [merge]: fold each group into one canonical entry
- [ids]: document-unique identifiers
!*/
pub mod group;
pub mod ids;
pub mod merge;
pub mod terms;

pub use group::{partition, Group, Partition};
pub use ids::assign_ids;
pub use merge::{merge, merge_all, merge_group};

use crate::entry::Entry;

/// Partition, merge and identify `entries`.
pub fn normalize(entries: Vec<Entry>) -> Vec<Entry> {
    let mut merged = merge_all(partition(entries));
    assign_ids(&mut merged);
    merged
}

/*! Encyclopedia data model.

An [Encyclopedia] is an ordered list of [Entry] plus document-level [Metadata].
Entries are never deleted: hiding is a [Status], and every mutation of an entry
is recorded in its append-only [HistoryRecord] list.
!*/
mod encyclopedia;
#[allow(clippy::module_inception)]
mod entry;
pub mod history;
mod metadata;
mod wikidata;

pub use encyclopedia::{Encyclopedia, Statistics};
pub use entry::{Category, DisambiguationOption, Entry, HideReason, Status};
pub use history::{HistoryAction, HistoryRecord};
pub use metadata::{ActionKind, ActionRecord, Metadata, Session};
pub use wikidata::WikidataId;

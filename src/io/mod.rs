/*!
# IO utilities

Loading of wordlists, dictionaries and rendered encyclopedias, and atomic saving
of the latter.
!*/
pub mod reader;
pub mod writer;

pub use reader::{load, parse, parse_source, read_source, Source};
pub use writer::save;

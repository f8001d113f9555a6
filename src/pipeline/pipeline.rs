//! Pipeline trait.
use crate::error::Error;

/// Implemented by each end-to-end pipeline. Generic over the return type so
/// that a pipeline can hand back a summary of what it did.
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}

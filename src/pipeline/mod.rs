//! Pipelines.
//!
//! End-to-end runs over whole files, on top of the light [Pipeline] trait.
mod create;
#[allow(clippy::module_inception)]
mod pipeline;

pub use create::{enrich, Create};
pub use pipeline::Pipeline;

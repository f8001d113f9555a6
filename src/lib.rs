#[macro_use]
extern crate log;

pub mod classify;
pub mod config;
pub mod entry;
pub mod error;
pub mod io;
pub mod lookup;
pub mod pipeline;
pub mod processing;
pub mod render;
pub mod state;

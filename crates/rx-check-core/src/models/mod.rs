//! Domain models for the rx-check system.

mod entry;
mod report;

pub use entry::*;
pub use report::*;

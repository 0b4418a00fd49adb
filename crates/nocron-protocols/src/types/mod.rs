//! Shared data model.

mod stats;
mod task;

pub use stats::*;
pub use task::*;

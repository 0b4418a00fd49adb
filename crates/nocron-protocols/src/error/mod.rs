//! Error types for the nocron protocol layer.

mod respawn;
mod store;
mod task;

pub use respawn::*;
pub use store::*;
pub use task::*;

//! # nocron Store
//!
//! Implementations of [`InstanceStore`](nocron_protocols::InstanceStore):
//!
//! - [`FileInstanceStore`]: one directory per instance, `flock`-guarded
//!   writes, atomic replace via rename.
//! - [`MemoryInstanceStore`]: process-local, for tests and embedding.

mod file;
mod lock;
mod memory;

pub use file::FileInstanceStore;
pub use memory::MemoryInstanceStore;

pub use nocron_protocols::is_valid_suffix;

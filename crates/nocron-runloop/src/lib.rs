//! # nocron RunLoop
//!
//! One worker invocation of an instance: tick every `interval` seconds until
//! the `window` closes, then hand off to the next invocation.
//!
//! ```text
//! invoke ──► authorize ──► ┌──────────── tick ◄───────────┐
//!                          │ pause? ──yes──► stop (no hand-off)
//!                          │ task gone? ───► stop (no hand-off)
//!                          │ execute ► record ► log ► sleep
//!                          └─ window left? ─yes──────────┘
//!                                 │ no
//!                                 ▼
//!                             respawn
//! ```
//!
//! ## Key Components
//!
//! - [`SchedulerLoop`]: the windowed tick loop
//! - [`RemoteFetchExecutor`], [`SandboxedCodeExecutor`], [`DispatchExecutor`]: task executors
//! - [`HttpRespawner`]: hand-off through the worker entry point
//! - [`LocalRespawner`] + [`LocalRelay`]: hand-off inside a long-lived process

pub mod error;
pub mod executor;
pub mod respawn;
pub mod scheduler;

pub use error::RunLoopError;
pub use executor::{CodeSandbox, DispatchExecutor, RemoteFetchExecutor, SandboxedCodeExecutor};
pub use respawn::{HttpRespawner, Invocation, LocalRelay, LocalRespawner};
pub use scheduler::{LoopOutcome, SchedulerLoop};

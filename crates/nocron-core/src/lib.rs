//! # nocron Core
//!
//! Everything that decides *whether* and *how* an instance changes, without
//! executing its task:
//!
//! - [`AuthGate`]: capability-token check shared by the worker and manager entries
//! - [`TaskValidator`]: the pure `validate` operation
//! - [`ControlPlane`]: update, pause, resume, stats and kill
//! - [`Installer`]: creates a fresh instance and its secret

pub mod auth;
pub mod control;
pub mod error;
pub mod install;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use auth::{AuthGate, AuthorizedInstance};
pub use control::{ControlOutcome, ControlPlane, ManagerAction, StatsView};
pub use error::{AuthError, ControlError, InstallError};
pub use install::{InstallReceipt, InstallRequest, Installer};
pub use validate::{TaskCandidate, TaskValidator, ValidationError};

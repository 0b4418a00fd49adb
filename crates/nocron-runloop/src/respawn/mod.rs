//! Respawn hand-off strategies.

mod http;
mod local;

pub use http::HttpRespawner;
pub use local::{Invocation, LocalRelay, LocalRespawner};

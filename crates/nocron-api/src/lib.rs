//! # nocron API
//!
//! HTTP surface of a nocron server.
//!
//! ```text
//! GET      /worker/{suffix}?auth=...            run one worker invocation
//! GET|POST /manager/{suffix}?auth=...&action=... validate|update|pause|resume|stats|kill
//! POST     /install                             create an instance
//! GET      /health                              liveness
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::envelope::Envelope;
pub use http::routes::create_router;
pub use server::{ApiServer, ServerSettings};
pub use state::{AppState, build_state};

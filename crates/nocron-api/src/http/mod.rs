//! HTTP handlers and routing.

pub mod envelope;
pub mod fields;
pub mod install;
pub mod manager;
pub mod monitoring;
pub mod routes;
pub mod worker;

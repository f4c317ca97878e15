//! HTTP server for the keeper's status and control API

mod http;

pub use http::{run, AppState};

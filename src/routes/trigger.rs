//! Manual harvest trigger endpoint
//!
//! POST /trigger runs one harvest cycle outside the schedule. A cycle that
//! is already in flight answers 409 Conflict rather than queueing a second
//! run behind the single-flight guard.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::server::AppState;
use crate::types::KeeperError;

/// Handle manual trigger (POST /trigger)
pub async fn trigger_harvest(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let (body, status) = match state.scheduler.trigger().await {
        Ok(Some(tx_hash)) => (
            json!({ "triggered": true, "completed": true, "txHash": tx_hash }),
            StatusCode::OK,
        ),
        // Window closed or pipeline ended without a finalize hash
        Ok(None) => (
            json!({ "triggered": true, "completed": false }),
            StatusCode::OK,
        ),
        Err(KeeperError::AlreadyRunning) => (
            json!({
                "triggered": false,
                "error": "Harvest cycle already in progress",
            }),
            StatusCode::CONFLICT,
        ),
        Err(e) => {
            error!("Manual harvest trigger failed: {}", e);
            (
                json!({ "triggered": false, "error": e.to_string() }),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

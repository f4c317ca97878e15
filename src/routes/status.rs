//! Keeper status endpoint
//!
//! Reads live distribution figures from the distributor contract and renders
//! them in operator-friendly units. A successful read refreshes the cached
//! snapshot; on failure the endpoint serves the last known snapshot marked
//! stale instead of erroring, so dashboards keep working through RPC blips.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::harvest::DistributionSnapshot;
use crate::server::AppState;

/// 7-decimal contract units to a decimal amount string
fn format_amount(units: i128) -> String {
    let sign = if units < 0 { "-" } else { "" };
    let abs = units.unsigned_abs();
    let whole = abs / 10_000_000;
    let frac = abs % 10_000_000;
    format!("{sign}{whole}.{frac:07}")
}

fn format_snapshot(snapshot: &DistributionSnapshot, stale: bool) -> serde_json::Value {
    let next_iso = chrono::DateTime::from_timestamp(snapshot.next_distribution_time as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    json!({
        "status": "active",
        "stale": stale,
        "distribution": {
            "available": snapshot.is_available,
            "timeUntilNext": format!("{} seconds", snapshot.time_remaining),
            "nextDistributionTime": next_iso,
            "distributionPeriod": format!("{} seconds", snapshot.distribution_period),
            "treasuryShare": format!("{}%", snapshot.treasury_share_bps as f64 / 100.0),
            "totalDistributed": format_amount(snapshot.total_distributed),
        },
    })
}

/// Handle status endpoint (/status)
pub async fn status_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let (body, status) = match state.checker.distribution_info().await {
        Ok(snapshot) => {
            let body = format_snapshot(&snapshot, false);
            *state.last_snapshot.write().await = Some(snapshot);
            (body, StatusCode::OK)
        }
        Err(e) => {
            warn!("Status read failed, serving cached snapshot: {}", e);
            match state.last_snapshot.read().await.as_ref() {
                Some(snapshot) => (format_snapshot(snapshot, true), StatusCode::OK),
                None => (
                    json!({ "status": "unavailable", "error": e.to_string() }),
                    StatusCode::SERVICE_UNAVAILABLE,
                ),
            }
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use crate::harvest::{EligibilityChecker, HarvestPipeline, HarvestScheduler};
    use crate::stellar::gateway::mock::MockGateway;
    use crate::stellar::gateway::ContractGateway;
    use clap::Parser;
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::time::Duration;

    fn state(mock: &Arc<MockGateway>) -> Arc<AppState> {
        let gateway = Arc::clone(mock) as Arc<dyn ContractGateway>;
        let checker = Arc::new(EligibilityChecker::new(
            Arc::clone(&gateway),
            "CDISTRIBUTOR".to_string(),
        ));
        let pipeline = HarvestPipeline::new(
            Arc::clone(&gateway),
            "CCONTROLLER".to_string(),
            "BLEND".to_string(),
            "USDC".to_string(),
            true,
            3,
        );
        let scheduler = Arc::new(HarvestScheduler::new(
            Arc::clone(&checker),
            pipeline,
            Duration::from_secs(30),
        ));
        let args = Args::parse_from([
            "yield-keeper",
            "--wallet-secret-seed",
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
            "--yield-distributor-id",
            "CDISTRIBUTOR",
            "--yield-controller-id",
            "CCONTROLLER",
        ]);
        Arc::new(AppState::new(args, scheduler, checker))
    }

    fn seed_reads(mock: &Arc<MockGateway>) {
        mock.set_read("is_distribution_available", json!(false));
        mock.set_read("time_before_next_distribution", json!(3600));
        mock.set_read("get_distribution_period", json!(86400));
        mock.set_read("get_next_distribution_time", json!(1_756_200_000u64));
        mock.set_read("get_treasury_share", json!(1000));
        mock.set_read("get_total_distributed", json!("125000000000"));
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_serves_cached_snapshot_when_read_fails() {
        let mock = Arc::new(MockGateway::new());
        seed_reads(&mock);
        let state = state(&mock);

        let first = status_check(Arc::clone(&state)).await;
        assert_eq!(first.status(), StatusCode::OK);
        let first = body_json(first).await;
        assert_eq!(first["stale"], false);
        assert_eq!(first["distribution"]["timeUntilNext"], "3600 seconds");

        // RPC goes away; the endpoint keeps answering with the last figures.
        mock.set_read_error("is_distribution_available", "rpc down");

        let second = status_check(Arc::clone(&state)).await;
        assert_eq!(second.status(), StatusCode::OK);
        let second = body_json(second).await;
        assert_eq!(second["stale"], true);
        assert_eq!(second["distribution"]["timeUntilNext"], "3600 seconds");
        assert_eq!(second["distribution"]["totalDistributed"], "12500.0000000");
    }

    #[tokio::test]
    async fn test_status_unavailable_before_any_snapshot() {
        let mock = Arc::new(MockGateway::new());
        mock.set_read_error("is_distribution_available", "rpc down");
        let state = state(&mock);

        let response = status_check(state).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["status"], "unavailable");
    }

    #[test]
    fn test_format_amount_seven_decimals() {
        assert_eq!(format_amount(125_000_000_000), "12500.0000000");
        assert_eq!(format_amount(12_345_678), "1.2345678");
        assert_eq!(format_amount(0), "0.0000000");
        assert_eq!(format_amount(-5_000_000), "-0.5000000");
    }

    #[test]
    fn test_format_snapshot_units() {
        let snapshot = DistributionSnapshot {
            is_available: false,
            time_remaining: 3600,
            next_distribution_time: 1_756_200_000,
            distribution_period: 86_400,
            treasury_share_bps: 1250,
            total_distributed: 12_345_678,
        };

        let rendered = format_snapshot(&snapshot, false);
        let dist = &rendered["distribution"];
        assert_eq!(dist["timeUntilNext"], "3600 seconds");
        assert_eq!(dist["distributionPeriod"], "86400 seconds");
        assert_eq!(dist["treasuryShare"], "12.5%");
        assert_eq!(dist["totalDistributed"], "1.2345678");
        assert!(dist["nextDistributionTime"]
            .as_str()
            .unwrap()
            .starts_with("2025-"));
    }
}

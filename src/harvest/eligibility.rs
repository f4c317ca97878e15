//! Distribution eligibility checks
//!
//! Read-only simulated calls against the yield distributor. Availability
//! failures propagate — the orchestrator must not harvest on an ambiguous
//! signal. Time-remaining failures degrade to 0 with a warning, treated as
//! "unknown, assume not yet".

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::stellar::gateway::ContractGateway;
use crate::types::{KeeperError, Result};

/// Last-known distribution figures, served by the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct DistributionSnapshot {
    pub is_available: bool,
    pub time_remaining: u64,
    /// Unix seconds of the next distribution window
    pub next_distribution_time: u64,
    pub distribution_period: u64,
    /// Treasury share in basis points
    pub treasury_share_bps: u64,
    /// Total distributed, in 7-decimal contract units
    pub total_distributed: i128,
}

/// Eligibility checker over the distributor contract
pub struct EligibilityChecker {
    gateway: Arc<dyn ContractGateway>,
    distributor_id: String,
}

impl EligibilityChecker {
    pub fn new(gateway: Arc<dyn ContractGateway>, distributor_id: String) -> Self {
        Self {
            gateway,
            distributor_id,
        }
    }

    async fn read(&self, method: &str) -> Result<serde_json::Value> {
        self.gateway
            .simulate_read_only(&self.distributor_id, method, vec![])
            .await
    }

    /// Is the distribution window open? Errors propagate to the caller.
    pub async fn check_availability(&self) -> Result<bool> {
        let value = self
            .read("is_distribution_available")
            .await
            .map_err(|e| KeeperError::Eligibility(e.to_string()))?;

        value
            .as_bool()
            .ok_or_else(|| KeeperError::Eligibility(format!("unexpected availability value: {value}")))
    }

    /// Seconds until the next distribution window. Non-fatal: failures
    /// degrade to 0 with a warning.
    pub async fn time_remaining(&self) -> u64 {
        match self.read("time_before_next_distribution").await {
            Ok(value) => value.as_u64().unwrap_or(0),
            Err(e) => {
                warn!("Failed to read time before next distribution: {}", e);
                0
            }
        }
    }

    /// Full distribution figures for the status endpoint
    pub async fn distribution_info(&self) -> Result<DistributionSnapshot> {
        let is_available = self.check_availability().await?;
        let time_remaining = self.time_remaining().await;

        let distribution_period = self
            .read("get_distribution_period")
            .await?
            .as_u64()
            .unwrap_or(0);
        let next_distribution_time = self
            .read("get_next_distribution_time")
            .await?
            .as_u64()
            .unwrap_or(0);
        let treasury_share_bps = self.read("get_treasury_share").await?.as_u64().unwrap_or(0);

        // i128 totals arrive as either a JSON number or a decimal string.
        let total = self.read("get_total_distributed").await?;
        let total_distributed = match &total {
            serde_json::Value::String(s) => s.parse::<i128>().unwrap_or(0),
            v => v.as_i64().map(i128::from).unwrap_or(0),
        };

        Ok(DistributionSnapshot {
            is_available,
            time_remaining,
            next_distribution_time,
            distribution_period,
            treasury_share_bps,
            total_distributed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stellar::gateway::mock::MockGateway;
    use serde_json::json;

    fn checker(mock: &Arc<MockGateway>) -> EligibilityChecker {
        EligibilityChecker::new(
            mock.clone() as Arc<dyn ContractGateway>,
            "CDISTRIBUTOR".to_string(),
        )
    }

    #[tokio::test]
    async fn test_availability_true() {
        let mock = Arc::new(MockGateway::new());
        mock.set_read("is_distribution_available", json!(true));

        assert!(checker(&mock).check_availability().await.unwrap());
    }

    #[tokio::test]
    async fn test_availability_error_propagates() {
        let mock = Arc::new(MockGateway::new());
        mock.set_read_error("is_distribution_available", "connection refused");

        let err = checker(&mock).check_availability().await.unwrap_err();
        assert!(matches!(err, KeeperError::Eligibility(_)));
    }

    #[tokio::test]
    async fn test_non_boolean_availability_is_ambiguous() {
        let mock = Arc::new(MockGateway::new());
        mock.set_read("is_distribution_available", json!("yes"));

        assert!(checker(&mock).check_availability().await.is_err());
    }

    #[tokio::test]
    async fn test_time_remaining_degrades_to_zero() {
        let mock = Arc::new(MockGateway::new());
        mock.set_read_error("time_before_next_distribution", "rpc down");

        assert_eq!(checker(&mock).time_remaining().await, 0);
    }

    #[tokio::test]
    async fn test_distribution_info_snapshot() {
        let mock = Arc::new(MockGateway::new());
        mock.set_read("is_distribution_available", json!(false));
        mock.set_read("time_before_next_distribution", json!(3600));
        mock.set_read("get_distribution_period", json!(86400));
        mock.set_read("get_next_distribution_time", json!(1756200000u64));
        mock.set_read("get_treasury_share", json!(1000));
        mock.set_read("get_total_distributed", json!("125000000000"));

        let snapshot = checker(&mock).distribution_info().await.unwrap();
        assert!(!snapshot.is_available);
        assert_eq!(snapshot.time_remaining, 3600);
        assert_eq!(snapshot.distribution_period, 86400);
        assert_eq!(snapshot.treasury_share_bps, 1000);
        assert_eq!(snapshot.total_distributed, 125_000_000_000);
    }
}

//! Harvest pipeline
//!
//! Runs the configured stage sequence against a fixed (protocol, asset)
//! pair, in strict order, continuing to the next stage when one fails. Each
//! stage maps to an idempotent, independently resumable contract operation
//! keyed by the remote pending-harvest record, so a transient failure in one
//! stage must not block a later stage the remote state already allows.
//!
//! The pipeline never raises past its own boundary: every stage failure is
//! classified and logged, and the caller receives the finalize stage's hash
//! when it succeeded, else None.

use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::harvest::{driver, errors};
use crate::stellar::gateway::ContractGateway;
use crate::types::KeeperError;

/// One stage of the harvest cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Withdraw accrued yield from the lending protocol
    Harvest,
    /// Re-deposit harvested yield to continue earning
    Recompound,
    /// Mint and distribute the stable asset to members
    Finalize,
    /// Legacy single-call variant combining all three
    ClaimYield,
}

impl Stage {
    /// Contract method name for this stage
    pub fn method(&self) -> &'static str {
        match self {
            Stage::Harvest => "harvest",
            Stage::Recompound => "recompound",
            Stage::Finalize => "finalize_distribution",
            Stage::ClaimYield => "claim_yield",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// Per-stage outcome, produced for logging
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

/// Success or classified failure of one stage
#[derive(Debug, Clone)]
pub enum StageOutcome {
    Success { tx_hash: String },
    Failed { reason: String },
}

/// Three-stage (or single-call) harvest pipeline
pub struct HarvestPipeline {
    gateway: Arc<dyn ContractGateway>,
    controller_id: String,
    protocol: String,
    asset: String,
    staged: bool,
    max_restore_retries: u32,
}

impl HarvestPipeline {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        controller_id: String,
        protocol: String,
        asset: String,
        staged: bool,
        max_restore_retries: u32,
    ) -> Self {
        Self {
            gateway,
            controller_id,
            protocol,
            asset,
            staged,
            max_restore_retries,
        }
    }

    /// Stage sequence for this configuration. The single-call variant is the
    /// degenerate pipeline of one stage.
    fn stages(&self) -> Vec<Stage> {
        if self.staged {
            vec![Stage::Harvest, Stage::Recompound, Stage::Finalize]
        } else {
            vec![Stage::ClaimYield]
        }
    }

    fn stage_args(&self, stage: Stage) -> Vec<serde_json::Value> {
        match stage {
            // claim_yield operates on the controller's full book
            Stage::ClaimYield => vec![],
            _ => vec![
                serde_json::Value::String(self.protocol.clone()),
                serde_json::Value::String(self.asset.clone()),
            ],
        }
    }

    /// Run every stage in order. Returns the final stage's transaction hash
    /// if that stage succeeded. Never returns an error.
    pub async fn run(&self) -> Option<String> {
        let mut results = Vec::new();

        for stage in self.stages() {
            let result = driver::execute_stage(
                &self.gateway,
                &self.controller_id,
                stage.method(),
                self.stage_args(stage),
                self.max_restore_retries,
            )
            .await;

            match result {
                Ok(tx_hash) => {
                    info!(stage = %stage, tx_hash = %tx_hash, "Harvest stage succeeded");
                    results.push(StageResult {
                        stage,
                        outcome: StageOutcome::Success { tx_hash },
                    });
                }
                Err(e) => {
                    let reason = self.describe_failure(&e);
                    warn!(stage = %stage, "Harvest stage failed: {}", reason);
                    results.push(StageResult {
                        stage,
                        outcome: StageOutcome::Failed { reason },
                    });
                }
            }
        }

        // The cycle's overall result is the final stage's hash.
        match results.last() {
            Some(StageResult {
                outcome: StageOutcome::Success { tx_hash },
                ..
            }) => Some(tx_hash.clone()),
            _ => None,
        }
    }

    /// Prefer the classified contract cause over the raw error text
    fn describe_failure(&self, error: &KeeperError) -> String {
        let raw = error.to_string();
        match errors::classify(&raw) {
            Some(cause) => cause.to_string(),
            None => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stellar::gateway::mock::MockGateway;
    use crate::stellar::types::SimulationOutcome;

    fn pipeline(mock: &Arc<MockGateway>, staged: bool) -> HarvestPipeline {
        HarvestPipeline::new(
            mock.clone() as Arc<dyn ContractGateway>,
            "CCONTROLLER".to_string(),
            "BLEND".to_string(),
            "USDC".to_string(),
            staged,
            3,
        )
    }

    #[tokio::test]
    async fn test_all_stages_succeed_returns_finalize_hash() {
        let mock = Arc::new(MockGateway::new());
        mock.queue_submit("harvest", Ok("0xAA".to_string()));
        mock.queue_submit("recompound", Ok("0xBB".to_string()));
        mock.queue_submit("finalize_distribution", Ok("0xCC".to_string()));

        let result = pipeline(&mock, true).run().await;

        assert_eq!(result, Some("0xCC".to_string()));
        assert_eq!(mock.count("prepare:"), 3);
    }

    #[tokio::test]
    async fn test_later_stages_attempted_after_first_stage_failure() {
        let mock = Arc::new(MockGateway::new());
        mock.queue_prepare(
            "harvest",
            SimulationOutcome::Error {
                message: "Error(Contract, #1005)".to_string(),
            },
        );

        pipeline(&mock, true).run().await;

        // Stages 2 and 3 still attempted exactly once each.
        assert_eq!(mock.count("prepare:harvest"), 1);
        assert_eq!(mock.count("prepare:recompound"), 1);
        assert_eq!(mock.count("prepare:finalize_distribution"), 1);
    }

    #[tokio::test]
    async fn test_middle_stage_failure_still_returns_finalize_hash() {
        // availability scenario from the distribution contract: harvest
        // succeeds, recompound rejects with an invalid-state code, finalize
        // still completes and its hash is the cycle result.
        let mock = Arc::new(MockGateway::new());
        mock.queue_submit("harvest", Ok("0xAA".to_string()));
        mock.queue_prepare(
            "recompound",
            SimulationOutcome::Error {
                message: "HostError: Error(Contract, #1004)".to_string(),
            },
        );
        mock.queue_submit("finalize_distribution", Ok("0xCC".to_string()));

        let result = pipeline(&mock, true).run().await;

        assert_eq!(result, Some("0xCC".to_string()));
    }

    #[tokio::test]
    async fn test_finalize_failure_yields_none() {
        let mock = Arc::new(MockGateway::new());
        mock.queue_submit("harvest", Ok("0xAA".to_string()));
        mock.queue_submit("recompound", Ok("0xBB".to_string()));
        mock.queue_prepare(
            "finalize_distribution",
            SimulationOutcome::Error {
                message: "Error(Contract, #1002)".to_string(),
            },
        );

        assert_eq!(pipeline(&mock, true).run().await, None);
    }

    #[tokio::test]
    async fn test_single_call_variant_runs_one_stage() {
        let mock = Arc::new(MockGateway::new());
        mock.queue_submit("claim_yield", Ok("0xDD".to_string()));

        let result = pipeline(&mock, false).run().await;

        assert_eq!(result, Some("0xDD".to_string()));
        assert_eq!(mock.count("prepare:"), 1);
        assert_eq!(mock.count("prepare:claim_yield"), 1);
    }

    #[test]
    fn test_classified_failure_description() {
        let mock = Arc::new(MockGateway::new());
        let p = pipeline(&mock, true);

        let described = p.describe_failure(&KeeperError::Simulation(
            "Error(Contract, #1004)".to_string(),
        ));
        assert_eq!(described, "Invalid harvest state for this operation.");

        let raw = p.describe_failure(&KeeperError::Rpc("network timeout".to_string()));
        assert_eq!(raw, "RPC error: network timeout");
    }
}

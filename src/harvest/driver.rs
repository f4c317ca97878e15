//! Staged transaction driver
//!
//! Executes one named contract write end-to-end: simulate, restore archived
//! state when the simulation asks for it, then sign and submit. The restore
//! path re-simulates from scratch because restoring can change ledger state.
//! The retry loop is bounded; exhausting it fails the stage rather than
//! looping on a platform that keeps reporting NeedsRestore.

use std::sync::Arc;
use tracing::{debug, info};

use crate::stellar::gateway::ContractGateway;
use crate::stellar::types::SimulationOutcome;
use crate::types::{KeeperError, Result};

/// Execute one write stage and return its transaction hash.
///
/// Failure semantics: simulation errors, restore failures and sign/submit
/// errors all terminate the stage. Only the NeedsRestore simulation outcome
/// is retried, at most `max_restore_retries` times.
pub async fn execute_stage(
    gateway: &Arc<dyn ContractGateway>,
    contract_id: &str,
    method: &str,
    args: Vec<serde_json::Value>,
    max_restore_retries: u32,
) -> Result<String> {
    let mut restores = 0u32;

    loop {
        let outcome = gateway
            .prepare_write(contract_id, method, args.clone())
            .await?;

        match outcome {
            SimulationOutcome::Error { message } => {
                return Err(KeeperError::Simulation(message));
            }

            SimulationOutcome::NeedsRestore { preamble } => {
                if restores >= max_restore_retries {
                    return Err(KeeperError::Simulation(format!(
                        "{method}: still requires restore after {max_restore_retries} attempts"
                    )));
                }
                restores += 1;

                info!(
                    method = %method,
                    attempt = restores,
                    "Simulation hit archived state, restoring"
                );

                // Restore failures are terminal for the stage, same as a
                // simulation error.
                gateway
                    .restore(&preamble)
                    .await
                    .map_err(|e| KeeperError::Simulation(e.to_string()))?;

                // State changed; the whole stage restarts from simulation.
                continue;
            }

            SimulationOutcome::Success { prepared } => {
                debug!(method = %method, "Simulation succeeded, signing");
                let signed = gateway.sign(&prepared)?;
                return gateway.submit(&signed).await;
            }
        }
    }
}

//! Contract gateway trait and its Soroban RPC implementation
//!
//! The harvest orchestrator is written against `ContractGateway` so that the
//! simulate/restore/sign/submit protocol can be scripted in tests. The
//! production implementation assembles single-operation envelopes, runs them
//! through simulateTransaction, signs with the keeper wallet and submits via
//! sendTransaction, polling getTransaction for the final status.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Args;
use crate::stellar::rpc::SorobanRpc;
use crate::stellar::signer::KeeperSigner;
use crate::stellar::types::{PreparedTx, RestorePreamble, SignedTx, SimulationOutcome};
use crate::types::{KeeperError, Result};

/// Operations the orchestrator needs from the remote contract platform
#[async_trait::async_trait]
pub trait ContractGateway: Send + Sync {
    /// Simulate a read-only contract call and return its decoded value
    async fn simulate_read_only(
        &self,
        contract_id: &str,
        method: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value>;

    /// Build and simulate a write call, without signing or submitting
    async fn prepare_write(
        &self,
        contract_id: &str,
        method: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<SimulationOutcome>;

    /// Restore archived ledger entries named by a simulation preamble
    async fn restore(&self, preamble: &RestorePreamble) -> Result<()>;

    /// Sign a prepared transaction with the keeper wallet
    fn sign(&self, prepared: &PreparedTx) -> Result<SignedTx>;

    /// Submit a signed transaction and return its hash once accepted
    async fn submit(&self, signed: &SignedTx) -> Result<String>;
}

/// Single-operation invocation envelope. One contract call per transaction,
/// which is why the pipeline issues its stages strictly one at a time.
#[derive(Debug, Serialize)]
struct CallEnvelope<'a> {
    source_account: &'a str,
    contract_id: &'a str,
    method: &'a str,
    args: &'a [serde_json::Value],
    fee: u64,
}

/// Production gateway over Soroban JSON-RPC
pub struct RpcGateway {
    rpc: SorobanRpc,
    signer: KeeperSigner,
    base_fee: u64,
}

impl RpcGateway {
    /// Build a gateway from keeper configuration
    pub fn from_args(args: &Args) -> Result<Self> {
        let seed = args.wallet_seed().map_err(KeeperError::Config)?;
        let signer = KeeperSigner::from_hex_seed(seed, args.network_passphrase())?;
        let rpc = SorobanRpc::new(
            &args.rpc_url,
            Duration::from_millis(args.request_timeout_ms),
        )?;

        Ok(Self {
            rpc,
            signer,
            base_fee: args.base_fee,
        })
    }

    /// Public key of the keeper wallet (for the startup banner)
    pub fn wallet_public_key(&self) -> String {
        self.signer.public_key()
    }

    fn build_envelope(
        &self,
        contract_id: &str,
        method: &str,
        args: &[serde_json::Value],
    ) -> Result<String> {
        let source_account = self.signer.public_key();
        let envelope = CallEnvelope {
            source_account: &source_account,
            contract_id,
            method,
            args,
            fee: self.base_fee,
        };

        let bytes = serde_json::to_vec(&envelope)
            .map_err(|e| KeeperError::Rpc(format!("Failed to encode envelope: {e}")))?;
        Ok(BASE64.encode(bytes))
    }
}

#[async_trait::async_trait]
impl ContractGateway for RpcGateway {
    async fn simulate_read_only(
        &self,
        contract_id: &str,
        method: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let envelope = self.build_envelope(contract_id, method, &args)?;
        let response = self.rpc.simulate_transaction(&envelope).await?;

        if let Some(error) = response.error {
            return Err(KeeperError::Simulation(error));
        }

        let value = response
            .results
            .into_iter()
            .next()
            .and_then(|r| r.return_value)
            .unwrap_or(serde_json::Value::Null);

        debug!(contract = %contract_id, method = %method, "Read-only simulation succeeded");
        Ok(value)
    }

    async fn prepare_write(
        &self,
        contract_id: &str,
        method: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<SimulationOutcome> {
        let envelope = self.build_envelope(contract_id, method, &args)?;
        let response = self.rpc.simulate_transaction(&envelope).await?;

        if let Some(message) = response.error {
            return Ok(SimulationOutcome::Error { message });
        }

        if let Some(preamble) = response.restore_preamble {
            debug!(
                contract = %contract_id,
                method = %method,
                "Simulation requires archived state restore"
            );
            return Ok(SimulationOutcome::NeedsRestore { preamble });
        }

        Ok(SimulationOutcome::Success {
            prepared: PreparedTx {
                envelope,
                transaction_data: response.transaction_data,
                min_resource_fee: response.min_resource_fee,
            },
        })
    }

    async fn restore(&self, preamble: &RestorePreamble) -> Result<()> {
        let fee = preamble
            .min_resource_fee
            .parse::<u64>()
            .unwrap_or(self.base_fee);

        let envelope_json = json!({
            "source_account": self.signer.public_key(),
            "operation": "restore_footprint",
            "transaction_data": preamble.transaction_data,
            "fee": fee,
        });
        let envelope = BASE64.encode(envelope_json.to_string());
        let signature = self.signer.sign_envelope(envelope.as_bytes());

        let response = self.rpc.send_transaction(&envelope, &signature).await?;
        if response.status == "ERROR" {
            return Err(KeeperError::Restore(
                response
                    .error_result
                    .unwrap_or_else(|| "restore submission rejected".to_string()),
            ));
        }

        let result = self.rpc.wait_for_transaction(&response.hash).await?;
        if result.status != "SUCCESS" {
            return Err(KeeperError::Restore(format!(
                "restore transaction {} ended with status {}",
                response.hash, result.status
            )));
        }

        debug!(hash = %response.hash, "Archived state restored");
        Ok(())
    }

    fn sign(&self, prepared: &PreparedTx) -> Result<SignedTx> {
        // The simulation's resource footprint and quoted fee must travel with
        // the submitted envelope, so they are folded in before signing.
        let envelope = match (&prepared.transaction_data, &prepared.min_resource_fee) {
            (None, None) => prepared.envelope.clone(),
            (data, fee) => {
                let assembled = json!({
                    "tx": prepared.envelope,
                    "transaction_data": data,
                    "min_resource_fee": fee,
                });
                BASE64.encode(assembled.to_string())
            }
        };

        let signature = self.signer.sign_envelope(envelope.as_bytes());
        Ok(SignedTx {
            envelope,
            signature,
        })
    }

    async fn submit(&self, signed: &SignedTx) -> Result<String> {
        let response = self
            .rpc
            .send_transaction(&signed.envelope, &signed.signature)
            .await?;

        if response.status == "ERROR" {
            return Err(KeeperError::Submission(
                response
                    .error_result
                    .unwrap_or_else(|| "transaction rejected on submission".to_string()),
            ));
        }

        let result = self.rpc.wait_for_transaction(&response.hash).await?;
        if result.status != "SUCCESS" {
            warn!(hash = %response.hash, status = %result.status, "Transaction failed on-chain");
            return Err(KeeperError::Submission(format!(
                "transaction {} ended with status {}",
                response.hash, result.status
            )));
        }

        match result.return_value {
            Some(ref value) if is_zero_amount(value) => {
                warn!(hash = %response.hash, "Transaction succeeded but claimed amount is zero");
            }
            Some(ref value) => {
                debug!(hash = %response.hash, amount = %value, "Transaction applied");
            }
            None => {}
        }

        Ok(response.hash)
    }
}

/// Zero-amount check over a decoded return value, which arrives as a JSON
/// number or a decimal string depending on the RPC
fn is_zero_amount(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Number(n) => n.as_i64() == Some(0) || n.as_u64() == Some(0),
        serde_json::Value::String(s) => s.parse::<i128>().map(|v| v == 0).unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn gateway() -> RpcGateway {
        let args = Args::parse_from([
            "yield-keeper",
            "--wallet-secret-seed",
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
            "--yield-distributor-id",
            "CDISTRIBUTOR",
            "--yield-controller-id",
            "CCONTROLLER",
        ]);
        RpcGateway::from_args(&args).unwrap()
    }

    #[test]
    fn test_sign_folds_resource_footprint_into_envelope() {
        let gw = gateway();
        let prepared = PreparedTx {
            envelope: "AAAA".to_string(),
            transaction_data: Some("FOOTPRINT".to_string()),
            min_resource_fee: Some("5000".to_string()),
        };

        let signed = gw.sign(&prepared).unwrap();

        assert_ne!(signed.envelope, prepared.envelope);
        let decoded = BASE64.decode(&signed.envelope).unwrap();
        let assembled: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(assembled["tx"], "AAAA");
        assert_eq!(assembled["transaction_data"], "FOOTPRINT");
        assert_eq!(assembled["min_resource_fee"], "5000");
    }

    #[test]
    fn test_sign_without_footprint_keeps_envelope() {
        let gw = gateway();
        let prepared = PreparedTx {
            envelope: "AAAA".to_string(),
            transaction_data: None,
            min_resource_fee: None,
        };

        let signed = gw.sign(&prepared).unwrap();
        assert_eq!(signed.envelope, "AAAA");
    }

    #[test]
    fn test_signature_covers_assembled_envelope() {
        let gw = gateway();
        let bare = PreparedTx {
            envelope: "AAAA".to_string(),
            transaction_data: None,
            min_resource_fee: None,
        };
        let with_footprint = PreparedTx {
            envelope: "AAAA".to_string(),
            transaction_data: Some("FOOTPRINT".to_string()),
            min_resource_fee: Some("5000".to_string()),
        };

        let a = gw.sign(&bare).unwrap();
        let b = gw.sign(&with_footprint).unwrap();
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn test_zero_amount_detection() {
        assert!(is_zero_amount(&serde_json::json!(0)));
        assert!(is_zero_amount(&serde_json::json!("0")));
        assert!(!is_zero_amount(&serde_json::json!(1_250_000)));
        assert!(!is_zero_amount(&serde_json::json!("1250000")));
        assert!(!is_zero_amount(&serde_json::json!(null)));
    }
}

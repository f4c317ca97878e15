//! Soroban JSON-RPC transport
//!
//! Thin reqwest client for the three RPC methods the keeper needs:
//! simulateTransaction, sendTransaction and getTransaction. Submitted
//! transactions are polled until the network reports a terminal status.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::stellar::types::{GetTransactionResponse, SendResponse, SimulateResponse};
use crate::types::{KeeperError, Result};

/// Polling interval while a submitted transaction is NOT_FOUND
const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Give up waiting for a submitted transaction after this many polls
const MAX_POLL_ATTEMPTS: u32 = 30;

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Soroban RPC client
pub struct SorobanRpc {
    http: reqwest::Client,
    url: String,
}

impl SorobanRpc {
    /// Create a client against the given RPC endpoint
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| KeeperError::Rpc(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    /// Issue one JSON-RPC call and unwrap the result
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!(method = %method, "Soroban RPC call");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| KeeperError::Rpc(format!("{method} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeeperError::Rpc(format!(
                "{method} returned HTTP {status}"
            )));
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| KeeperError::Rpc(format!("{method} returned malformed JSON: {e}")))?;

        if let Some(err) = envelope.error {
            return Err(KeeperError::Rpc(format!(
                "{method} failed: {} (code {})",
                err.message, err.code
            )));
        }

        envelope
            .result
            .ok_or_else(|| KeeperError::Rpc(format!("{method} returned no result")))
    }

    /// Simulate a transaction envelope
    pub async fn simulate_transaction(&self, envelope_b64: &str) -> Result<SimulateResponse> {
        self.call("simulateTransaction", json!({ "transaction": envelope_b64 }))
            .await
    }

    /// Submit a signed transaction envelope
    pub async fn send_transaction(
        &self,
        envelope_b64: &str,
        signature_hex: &str,
    ) -> Result<SendResponse> {
        self.call(
            "sendTransaction",
            json!({ "transaction": envelope_b64, "signature": signature_hex }),
        )
        .await
    }

    /// Look up a submitted transaction by hash
    pub async fn get_transaction(&self, hash: &str) -> Result<GetTransactionResponse> {
        self.call("getTransaction", json!({ "hash": hash })).await
    }

    /// Poll a submitted transaction until it leaves NOT_FOUND or the attempt
    /// budget runs out
    pub async fn wait_for_transaction(&self, hash: &str) -> Result<GetTransactionResponse> {
        let mut attempts = 0u32;

        loop {
            let response = self.get_transaction(hash).await?;

            if response.status != "NOT_FOUND" {
                return Ok(response);
            }

            attempts += 1;
            if attempts >= MAX_POLL_ATTEMPTS {
                return Err(KeeperError::Submission(format!(
                    "Transaction {hash} not found after {MAX_POLL_ATTEMPTS} attempts"
                )));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

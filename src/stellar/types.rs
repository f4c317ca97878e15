//! Wire and domain types for the Soroban gateway

use serde::{Deserialize, Serialize};

/// Preamble returned by simulation when archived ledger entries must be
/// restored before the call can execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorePreamble {
    /// Opaque transaction data for the restore operation (base64)
    #[serde(rename = "transactionData")]
    pub transaction_data: String,
    /// Minimum resource fee for the restore, in stroops
    #[serde(rename = "minResourceFee")]
    pub min_resource_fee: String,
}

/// A simulated-but-unsigned transaction, ready for signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTx {
    /// Base64 transaction envelope as sent to the RPC
    pub envelope: String,
    /// Resource footprint attached by the simulation (base64)
    pub transaction_data: Option<String>,
    /// Resource fee quoted by the simulation, in stroops
    pub min_resource_fee: Option<String>,
}

/// A signed transaction ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    /// Base64 transaction envelope
    pub envelope: String,
    /// Hex-encoded ed25519 signature over the network-scoped envelope hash
    pub signature: String,
}

/// Outcome of simulating a write call. Drives the staged driver's control
/// flow: errors fail the stage, NeedsRestore triggers a restore-and-retry,
/// Success proceeds to signing.
#[derive(Debug, Clone)]
pub enum SimulationOutcome {
    /// The remote rejected the call
    Error { message: String },
    /// Archived state must be restored before the call can execute
    NeedsRestore { preamble: RestorePreamble },
    /// The call simulated cleanly
    Success { prepared: PreparedTx },
}

// ---------------------------------------------------------------------------
// Soroban RPC response shapes
// ---------------------------------------------------------------------------

/// Result of `simulateTransaction`
#[derive(Debug, Clone, Deserialize)]
pub struct SimulateResponse {
    /// Present when the simulation failed
    pub error: Option<String>,
    /// Present when archived entries must be restored first
    #[serde(rename = "restorePreamble")]
    pub restore_preamble: Option<RestorePreamble>,
    /// Resource footprint for the assembled transaction (base64)
    #[serde(rename = "transactionData")]
    pub transaction_data: Option<String>,
    /// Quoted resource fee in stroops
    #[serde(rename = "minResourceFee")]
    pub min_resource_fee: Option<String>,
    /// Per-operation simulation results (single element: one op per tx)
    #[serde(default)]
    pub results: Vec<SimulateResult>,
}

/// One operation's simulation result
#[derive(Debug, Clone, Deserialize)]
pub struct SimulateResult {
    /// Decoded return value of the invoked function
    #[serde(rename = "returnValue")]
    pub return_value: Option<serde_json::Value>,
}

/// Result of `sendTransaction`
#[derive(Debug, Clone, Deserialize)]
pub struct SendResponse {
    /// PENDING, DUPLICATE, TRY_AGAIN_LATER or ERROR
    pub status: String,
    /// Transaction hash assigned by the network
    pub hash: String,
    /// Error detail when status is ERROR
    #[serde(rename = "errorResult")]
    pub error_result: Option<String>,
}

/// Result of `getTransaction`
#[derive(Debug, Clone, Deserialize)]
pub struct GetTransactionResponse {
    /// NOT_FOUND, SUCCESS or FAILED
    pub status: String,
    /// Decoded return value once the transaction has been applied
    #[serde(rename = "returnValue")]
    pub return_value: Option<serde_json::Value>,
}

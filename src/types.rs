//! Shared error and result types for Yield Keeper

use thiserror::Error;

/// Errors surfaced by the keeper's components
#[derive(Debug, Error)]
pub enum KeeperError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level RPC failure (connection, timeout, malformed response)
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The remote simulation rejected the call
    #[error("Simulation failed: {0}")]
    Simulation(String),

    /// Restoring archived ledger state failed
    #[error("Restore failed: {0}")]
    Restore(String),

    /// Signing or submitting the transaction failed
    #[error("Submission failed: {0}")]
    Submission(String),

    /// The eligibility check itself failed (ambiguous signal, cycle aborted)
    #[error("Eligibility check failed: {0}")]
    Eligibility(String),

    /// A harvest cycle is already in flight
    #[error("Harvest cycle already in progress")]
    AlreadyRunning,

    /// IO error (server socket, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type
pub type Result<T> = std::result::Result<T, KeeperError>;

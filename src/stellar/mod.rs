//! Soroban contract gateway
//!
//! Everything that talks to the remote ledger lives here: the JSON-RPC
//! transport, the keeper's signing key, and the `ContractGateway` trait the
//! harvest orchestrator is written against.

pub mod gateway;
pub mod rpc;
pub mod signer;
pub mod types;

pub use gateway::{ContractGateway, RpcGateway};
pub use signer::KeeperSigner;
pub use types::{PreparedTx, RestorePreamble, SignedTx, SimulationOutcome};

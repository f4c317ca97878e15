//! Yield Keeper - scheduled harvest keeper for Soroban yield distribution
//!
//! Watches a yield distributor contract for an open distribution window and,
//! when one opens, drives the lending yield controller through its staged
//! harvest cycle: withdraw accrued yield, recompound it, then finalize the
//! distribution to members.
//!
//! ## Services
//!
//! - **Scheduler**: periodic single-flight harvest cycles
//! - **Pipeline**: harvest / recompound / finalize stage sequencing
//! - **Gateway**: Soroban simulate, restore, sign and submit plumbing
//! - **API**: health, status and manual-trigger HTTP endpoints

pub mod config;
pub mod harvest;
pub mod routes;
pub mod server;
pub mod stellar;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{KeeperError, Result};

//! HTTP routes for Yield Keeper

pub mod health;
pub mod status;
pub mod trigger;

pub use health::{health_check, version_info};
pub use status::status_check;
pub use trigger::trigger_harvest;

//! Harvest orchestration
//!
//! Eligibility gating, the staged transaction driver, the stage pipeline and
//! the single-flight scheduler that ties them together.

pub mod driver;
pub mod eligibility;
pub mod errors;
pub mod pipeline;
pub mod scheduler;

pub use eligibility::{DistributionSnapshot, EligibilityChecker};
pub use pipeline::{HarvestPipeline, Stage, StageOutcome, StageResult};
pub use scheduler::{spawn_scheduler_task, HarvestScheduler};

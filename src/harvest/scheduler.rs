//! Harvest scheduler and single-flight guard
//!
//! Fires the pipeline on a timer tick or a manual trigger, with an Idle /
//! Running state held in an atomic flag. The flag is acquired with a
//! compare-exchange and released by a scope guard's Drop, so every exit
//! path (including eligibility errors) returns the scheduler to Idle.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::harvest::eligibility::EligibilityChecker;
use crate::harvest::pipeline::HarvestPipeline;
use crate::types::{KeeperError, Result};

/// The one in-flight cycle, created on guard acquisition
struct HarvestCycle {
    id: Uuid,
    started_at: DateTime<Utc>,
}

/// Releases the Running flag when the cycle ends, on every exit path
struct CycleGuard<'a> {
    running: &'a AtomicBool,
    cycle: HarvestCycle,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let elapsed = Utc::now() - self.cycle.started_at;
        debug!(
            cycle = %self.cycle.id,
            elapsed_ms = elapsed.num_milliseconds(),
            "Harvest cycle ended"
        );
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Scheduler driving the harvest pipeline
pub struct HarvestScheduler {
    checker: Arc<EligibilityChecker>,
    pipeline: HarvestPipeline,
    running: AtomicBool,
    interval: Duration,
}

impl HarvestScheduler {
    pub fn new(
        checker: Arc<EligibilityChecker>,
        pipeline: HarvestPipeline,
        interval: Duration,
    ) -> Self {
        Self {
            checker,
            pipeline,
            running: AtomicBool::new(false),
            interval,
        }
    }

    /// Whether a cycle is currently in flight
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Acquire the single-flight guard, or fail if a cycle is in flight
    fn acquire(&self) -> Result<CycleGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| KeeperError::AlreadyRunning)?;

        Ok(CycleGuard {
            running: &self.running,
            cycle: HarvestCycle {
                id: Uuid::new_v4(),
                started_at: Utc::now(),
            },
        })
    }

    /// Run one cycle: guard, eligibility gate, then the pipeline.
    ///
    /// Returns the finalize transaction hash when the pipeline ran and its
    /// final stage succeeded, None when the window was not open. Eligibility
    /// errors propagate; the guard is released regardless.
    async fn run_cycle(&self) -> Result<Option<String>> {
        let guard = self.acquire()?;
        info!(cycle = %guard.cycle.id, "Checking yield distribution availability");

        let available = self.checker.check_availability().await?;
        if !available {
            let remaining = self.checker.time_remaining().await;
            debug!(
                "Distribution not yet available, {} seconds until next window",
                remaining
            );
            return Ok(None);
        }

        // Guard against clock skew between local scheduling and the remote
        // window: require the remaining time to have fully elapsed as well.
        let remaining = self.checker.time_remaining().await;
        if remaining != 0 {
            debug!(
                "Distribution window not fully open, {} seconds remaining",
                remaining
            );
            return Ok(None);
        }

        info!("Distribution is available, running harvest pipeline");
        Ok(self.pipeline.run().await)
    }

    /// Timer tick. Re-entrant ticks are dropped with a debug notice; all
    /// other failures are logged and leave the scheduler Idle for the next
    /// tick.
    pub async fn tick(&self) {
        match self.run_cycle().await {
            Ok(Some(tx_hash)) => {
                info!(tx_hash = %tx_hash, "Harvest cycle completed");
            }
            Ok(None) => {}
            Err(KeeperError::AlreadyRunning) => {
                debug!("Harvest cycle already in progress, skipping");
            }
            Err(e) => {
                error!("Harvest cycle failed: {}", e);
            }
        }
    }

    /// Manual trigger. Unlike a tick, a concurrency conflict is surfaced to
    /// the caller instead of being swallowed.
    pub async fn trigger(&self) -> Result<Option<String>> {
        self.run_cycle().await
    }
}

/// Spawn the periodic scheduler loop
pub fn spawn_scheduler_task(scheduler: Arc<HarvestScheduler>) -> JoinHandle<()> {
    let interval = scheduler.interval;

    tokio::spawn(async move {
        info!("Harvest scheduler started (interval: {:?})", interval);
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip straight to the cadence.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            scheduler.tick().await;
        }
    })
}

//! Drives a simulation for a fixed logical duration.
//!
//! The engine has no notion of cancellation or progress; both live here,
//! between `advance` calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use sx_engine::Simulation;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage, SimProgress};

/// Progress events per run, at most.
const PROGRESS_EVENTS: usize = 100;

/// Slack for `duration / dt` landing just below an integer.
const STEP_EPSILON: f64 = 1e-9;

/// Cloneable cancellation flag shared between a run and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveOutcome {
    pub steps_completed: usize,
    pub steps_requested: usize,
    pub cancelled: bool,
    /// Most settle passes any single tick needed.
    pub max_passes: usize,
    /// Component evaluations across the whole run.
    pub total_ticks: usize,
}

/// `floor(duration_s / dt)`, rejecting non-positive or non-finite durations.
pub fn step_count(duration_s: f64, dt: f64) -> AppResult<usize> {
    if !(duration_s.is_finite() && duration_s > 0.0) {
        return Err(AppError::InvalidInput(format!(
            "duration must be positive and finite, got {duration_s}"
        )));
    }
    Ok((duration_s / dt + STEP_EPSILON).floor() as usize)
}

/// Reset `sim`, then advance it `floor(duration_s / dt)` times.
///
/// Stops early, without error, once `cancel` is set. A tick that fails to
/// settle aborts the run with [`AppError::Simulation`].
pub fn drive(
    sim: &mut Simulation,
    duration_s: f64,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(RunProgressEvent),
) -> AppResult<DriveOutcome> {
    let started = Instant::now();
    let steps = step_count(duration_s, sim.dt())?;
    let every = (steps / PROGRESS_EVENTS).max(1);

    sim.reset();
    info!(steps, dt = sim.dt(), duration_s, "run started");

    let mut outcome = DriveOutcome {
        steps_requested: steps,
        ..DriveOutcome::default()
    };

    for step in 0..steps {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            info!(step, steps, "run cancelled");
            break;
        }

        let report = sim.advance()?;
        outcome.steps_completed += 1;
        outcome.total_ticks += report.ticks;
        outcome.max_passes = outcome.max_passes.max(report.passes);

        let done = step + 1;
        if done % every == 0 || done == steps {
            on_progress(RunProgressEvent {
                stage: RunStage::Running,
                elapsed_wall_s: started.elapsed().as_secs_f64(),
                message: None,
                sim: Some(SimProgress {
                    sim_time_s: sim.current_time(),
                    step: done,
                    steps,
                    fraction_complete: done as f64 / steps as f64,
                }),
            });
        }
    }

    debug!(
        steps_completed = outcome.steps_completed,
        max_passes = outcome.max_passes,
        total_ticks = outcome.total_ticks,
        "run finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_floors_with_slack() {
        assert_eq!(step_count(0.3, 0.1).unwrap(), 3);
        assert_eq!(step_count(2.2, 0.001).unwrap(), 2200);
        assert_eq!(step_count(0.25, 0.1).unwrap(), 2);
        assert!(step_count(0.0, 0.1).is_err());
        assert!(step_count(f64::NAN, 0.1).is_err());
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }
}

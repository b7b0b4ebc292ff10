//! Shared application service layer for simplexsim.
//!
//! Centralizes scenario lookup, the run driver, result caching and
//! queries so front ends only handle presentation.

pub mod driver;
pub mod error;
pub mod progress;
pub mod query;
pub mod run_service;
pub mod scenario_service;

pub use driver::{CancelToken, DriveOutcome, drive, step_count};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage, SimProgress};
pub use query::{RunSummary, WireSummary, extract_wire_series, get_run_summary, list_wire_names};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run, ensure_run_with_progress,
    list_runs, load_run,
};
pub use scenario_service::{ScenarioSummary, describe_topology, list_scenarios, parse_overrides};

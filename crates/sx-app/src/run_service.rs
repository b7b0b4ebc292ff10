//! Run execution and caching service.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use sx_results::{RunManifest, RunStore, WireSeries};
use sx_scenarios::{ParamValue, Registry};
use tracing::info;

use crate::driver::{self, CancelToken};
use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage};

/// Options for running scenarios.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: sx_engine::VERSION.to_string(),
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub store_dir: &'a Path,
    pub scenario_id: &'a str,
    pub overrides: BTreeMap<String, ParamValue>,
    /// Scenario default when `None`.
    pub duration_s: Option<f64>,
    pub options: RunOptions,
    pub cancel: CancelToken,
}

/// Concise timing and execution summary for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub build_time_s: f64,
    pub drive_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
    pub max_passes: usize,
    pub total_ticks: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: &str,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            Some(message.to_string()),
        ));
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::BuildingScenario,
        started,
        "Building scenario",
    );

    let registry = Registry::builtin();
    let def = registry.get(request.scenario_id)?;
    let build_start = Instant::now();
    let mut built = def.build(&request.overrides)?;
    timing.build_time_s = build_start.elapsed().as_secs_f64();

    let duration_s = request.duration_s.unwrap_or(def.default_duration_s);
    let run_id = sx_results::compute_run_id(
        &def.id,
        &built.params,
        duration_s,
        &request.options.engine_version,
    );

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        "Checking run cache",
    );
    let store = RunStore::new(request.store_dir.to_path_buf())?;

    if request.options.use_cache && store.has_run(&run_id) {
        let load_start = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        if manifest.complete {
            emit_progress(
                &mut progress_cb,
                RunStage::LoadingCachedResult,
                started,
                "Loaded cached run",
            );
            timing.load_cache_time_s = load_start.elapsed().as_secs_f64();
            timing.steps = manifest.steps_completed;
            timing.total_time_s = started.elapsed().as_secs_f64();
            info!(run_id = %run_id, scenario = %def.id, "using cached run");
            return Ok(RunResponse {
                run_id,
                manifest,
                loaded_from_cache: true,
                timing,
            });
        }
    }

    emit_progress(&mut progress_cb, RunStage::Running, started, "Running");
    let drive_start = Instant::now();
    let outcome = driver::drive(&mut built.sim, duration_s, &request.cancel, |event| {
        if let Some(cb) = progress_cb.as_deref_mut() {
            cb(event);
        }
    })?;
    timing.drive_time_s = drive_start.elapsed().as_secs_f64();
    timing.steps = outcome.steps_completed;
    timing.max_passes = outcome.max_passes;
    timing.total_ticks = outcome.total_ticks;

    if outcome.cancelled {
        emit_progress(&mut progress_cb, RunStage::Cancelled, started, "Cancelled");
    }

    emit_progress(
        &mut progress_cb,
        RunStage::SavingResults,
        started,
        "Saving results",
    );
    let save_start = Instant::now();
    let series: Vec<WireSeries> = built
        .sim
        .wires()
        .map(|w| WireSeries {
            wire: w.name().to_string(),
            time_s: w.time_axis().to_vec(),
            value: w.history().to_vec(),
        })
        .collect();

    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_id: def.id.clone(),
        timestamp: RunManifest::stamp(),
        engine_version: request.options.engine_version.clone(),
        params: built.params.clone(),
        dt_s: built.sim.dt(),
        duration_s,
        steps_requested: outcome.steps_requested,
        steps_completed: outcome.steps_completed,
        complete: !outcome.cancelled,
        wires: series.iter().map(|s| s.wire.clone()).collect(),
    };
    store.save_run(&manifest, &series)?;
    timing.save_time_s = save_start.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    emit_progress(&mut progress_cb, RunStage::Completed, started, "Completed");
    info!(
        run_id = %run_id,
        scenario = %def.id,
        steps = outcome.steps_completed,
        complete = manifest.complete,
        total_time_s = timing.total_time_s,
        "run stored"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

/// Stored runs of a scenario, oldest first.
pub fn list_runs(store_dir: &Path, scenario_id: &str) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::new(store_dir.to_path_buf())?;
    Ok(store.list_runs(scenario_id)?)
}

/// Manifest and every wire series of a stored run.
pub fn load_run(store_dir: &Path, run_id: &str) -> AppResult<(RunManifest, Vec<WireSeries>)> {
    let store = RunStore::new(store_dir.to_path_buf())?;
    let manifest = store.load_manifest(run_id)?;
    let series = store.load_series(run_id)?;
    Ok((manifest, series))
}

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use sx_app::{
    AppError, AppResult, CancelToken, RunOptions, RunProgressEvent, RunRequest, RunStage, query,
    run_service, scenario_service,
};
use sx_scenarios::{ParamValue, Registry, RunConfig};

#[derive(Parser)]
#[command(name = "sx-cli")]
#[command(about = "simplexsim CLI - discrete-time signal chain simulator", long_about = None)]
struct Cli {
    /// Directory holding cached runs
    #[arg(long, global = true, default_value = ".simplexsim/runs")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in scenarios
    Scenarios,
    /// Show a scenario's parameters
    Describe {
        /// Scenario ID
        scenario: String,
    },
    /// Run a scenario
    Run {
        /// Scenario ID (optional when --config names one)
        scenario: Option<String>,
        /// Logical duration in seconds
        #[arg(long)]
        duration: Option<f64>,
        /// Parameter override, key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// YAML run configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Cancel the run after this many wall-clock seconds; completed
        /// steps are stored as an incomplete run
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<f64>,
    },
    /// List cached runs for a scenario
    Runs {
        /// Scenario ID to list runs for
        scenario: String,
    },
    /// Show details of a cached run
    ShowRun {
        /// Run ID to display
        run_id: String,
    },
    /// Export one wire's series from a run as CSV
    ExportSeries {
        /// Run ID
        run_id: String,
        /// Wire name
        wire: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the wires and components a scenario builds
    Topology {
        /// Scenario ID
        scenario: String,
        /// Parameter override, key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store = cli.store.as_path();

    match cli.command {
        Commands::Scenarios => cmd_scenarios(),
        Commands::Describe { scenario } => cmd_describe(&scenario),
        Commands::Run {
            scenario,
            duration,
            set,
            config,
            no_cache,
            timeout,
        } => cmd_run(
            store,
            scenario.as_deref(),
            duration,
            &set,
            config.as_deref(),
            !no_cache,
            timeout,
        ),
        Commands::Runs { scenario } => cmd_runs(store, &scenario),
        Commands::ShowRun { run_id } => cmd_show_run(store, &run_id),
        Commands::ExportSeries {
            run_id,
            wire,
            output,
        } => cmd_export_series(store, &run_id, &wire, output.as_deref()),
        Commands::Topology { scenario, set } => cmd_topology(&scenario, &set),
    }
}

fn cmd_scenarios() -> AppResult<()> {
    let registry = Registry::builtin();
    println!("Scenarios:");
    for s in scenario_service::list_scenarios(&registry) {
        println!(
            "  {:<32} {} ({} params, default {:.2} s)",
            s.id, s.title, s.param_count, s.default_duration_s
        );
    }
    Ok(())
}

fn cmd_describe(scenario: &str) -> AppResult<()> {
    let registry = Registry::builtin();
    let def = registry.get(scenario)?;

    println!("{} - {}", def.id, def.title);
    println!("  {}", def.description);
    println!("  Default duration: {} s", def.default_duration_s);
    println!("\nParameters:");
    for p in &def.params {
        println!(
            "  {:<18} {:<6} default={:<22} {}",
            p.name,
            p.kind.to_string(),
            p.default.to_string(),
            p.help
        );
    }
    Ok(())
}

fn cmd_run(
    store_dir: &Path,
    scenario: Option<&str>,
    duration: Option<f64>,
    set: &[String],
    config: Option<&Path>,
    use_cache: bool,
    timeout_s: Option<f64>,
) -> AppResult<()> {
    if let Some(t) = timeout_s
        && !(t.is_finite() && t > 0.0)
    {
        return Err(AppError::InvalidInput(format!(
            "timeout must be positive, got {}",
            t
        )));
    }

    let config = config.map(sx_scenarios::load_yaml).transpose()?;
    if let Some(cfg) = &config {
        tracing::debug!(scenario = %cfg.scenario, "loaded run configuration");
    }

    let scenario_id = match (scenario, &config) {
        (Some(id), _) => id.to_string(),
        (None, Some(cfg)) => cfg.scenario.clone(),
        (None, None) => {
            return Err(AppError::InvalidInput(
                "a scenario id or --config is required".to_string(),
            ));
        }
    };

    let registry = Registry::builtin();
    let def = registry.get(&scenario_id)?;

    // File values first, then command-line overrides on top.
    let mut overrides: BTreeMap<String, ParamValue> = config
        .as_ref()
        .filter(|cfg| cfg.scenario == scenario_id)
        .map(|cfg| cfg.params.clone())
        .unwrap_or_default();
    overrides.extend(scenario_service::parse_overrides(def, set)?);

    let duration_s = duration.or_else(|| config.as_ref().and_then(|c: &RunConfig| c.duration_s));

    println!("Running scenario: {}", scenario_id);

    let request = RunRequest {
        store_dir,
        scenario_id: &scenario_id,
        overrides,
        duration_s,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
        cancel: CancelToken::new(),
    };

    let cancel = request.cancel.clone();
    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event: RunProgressEvent| {
            if timeout_s.is_some_and(|t| event.elapsed_wall_s >= t) {
                cancel.cancel();
            }
            let fraction = event
                .sim
                .as_ref()
                .map(|s| s.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else if !response.manifest.complete {
        println!(
            "✗ Timed out after {}/{} steps, stored incomplete: {}",
            response.manifest.steps_completed,
            response.manifest.steps_requested,
            response.run_id
        );
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    print_timing_summary(&response.timing);

    let (manifest, series) = run_service::load_run(store_dir, &response.run_id)?;
    let summary = query::get_run_summary(&manifest, &series)?;
    println!("  Steps: {}", summary.steps_completed);
    println!("  Wires: {}", summary.wires.len());

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.sim) {
        (RunStage::Running, Some(s)) => {
            let width = 28usize;
            let filled = ((s.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.4}s  step={}/{}  elapsed={:.1}s",
                bar,
                s.fraction_complete * 100.0,
                s.sim_time_s,
                s.step,
                s.steps,
                event.elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_timing_summary(timing: &sx_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let build_pct = 100.0 * timing.build_time_s / total;
    let drive_pct = 100.0 * timing.drive_time_s / total;
    let save_pct = 100.0 * timing.save_time_s / total;

    println!("\nTiming summary:");
    println!("  Build:   {:.3}s ({:.1}%)", timing.build_time_s, build_pct);
    println!("  Drive:   {:.3}s ({:.1}%)", timing.drive_time_s, drive_pct);
    println!("  Save:    {:.3}s ({:.1}%)", timing.save_time_s, save_pct);
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    }
    println!("  Total:   {:.3}s", timing.total_time_s);
    if timing.total_ticks > 0 {
        println!("  Stage ticks: {}", timing.total_ticks);
        println!("  Max passes per tick: {}", timing.max_passes);
    }
}

fn cmd_runs(store_dir: &Path, scenario: &str) -> AppResult<()> {
    let runs = run_service::list_runs(store_dir, scenario)?;

    if runs.is_empty() {
        println!("No cached runs found for scenario: {}", scenario);
    } else {
        println!("Cached runs for scenario '{}':", scenario);
        for manifest in runs {
            let status = if manifest.complete { "" } else { " [incomplete]" };
            println!("  {} ({}){}", manifest.run_id, manifest.timestamp, status);
        }
    }
    Ok(())
}

fn cmd_show_run(store_dir: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, series) = run_service::load_run(store_dir, run_id)?;
    let summary = query::get_run_summary(&manifest, &series)?;

    println!("\nRun Summary:");
    println!("  Scenario: {}", summary.scenario_id);
    println!("  Recorded: {}", manifest.timestamp);
    println!(
        "  Steps: {}/{}{}",
        summary.steps_completed,
        manifest.steps_requested,
        if summary.complete { "" } else { " (cancelled)" }
    );
    println!(
        "  Time range: {:.4} - {:.4} s (dt = {} s)",
        summary.time_range.0, summary.time_range.1, manifest.dt_s
    );

    println!("\nParameters:");
    for (name, value) in manifest.params.iter() {
        println!("  {} = {}", name, value);
    }

    println!("\nWires:");
    for w in &summary.wires {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v));
        println!(
            "  {:<32} samples={} min={} max={} mean={} last={}",
            w.name,
            w.samples,
            fmt(w.min),
            fmt(w.max),
            fmt(w.mean),
            fmt(w.last)
        );
    }

    Ok(())
}

fn cmd_export_series(
    store_dir: &Path,
    run_id: &str,
    wire: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, series) = run_service::load_run(store_dir, run_id)?;
    let data = query::extract_wire_series(&series, wire)?;

    // Build CSV
    let mut csv = String::from("time_s,value\n");
    for (t, val) in &data {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    // Write to file or stdout
    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            data.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}

fn cmd_topology(scenario: &str, set: &[String]) -> AppResult<()> {
    let registry = Registry::builtin();
    let def = registry.get(scenario)?;
    let overrides = scenario_service::parse_overrides(def, set)?;
    print!("{}", scenario_service::describe_topology(def, &overrides)?);
    Ok(())
}

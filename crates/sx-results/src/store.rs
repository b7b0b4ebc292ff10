//! Run storage API.
//!
//! Layout: `<root>/<run_id>/manifest.json` plus `series.jsonl` holding one
//! [`WireSeries`] per line.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{RunManifest, WireSeries};
use crate::{ResultsError, ResultsResult};

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, series: &[WireSeries]) -> ResultsResult<()> {
        for s in series {
            if s.time_s.len() != s.value.len() {
                return Err(ResultsError::InvalidSeries {
                    wire: s.wire.clone(),
                    what: format!("{} times vs {} values", s.time_s.len(), s.value.len()),
                });
            }
        }

        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let mut content = String::new();
        for s in series {
            content.push_str(&serde_json::to_string(s)?);
            content.push('\n');
        }
        fs::write(run_dir.join("series.jsonl"), content)?;

        // Manifest last: its presence marks the run as stored.
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join("manifest.json"), manifest_json)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_series(&self, run_id: &str) -> ResultsResult<Vec<WireSeries>> {
        let series_path = self.run_dir(run_id).join("series.jsonl");

        if !series_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(series_path)?;
        let mut series = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                series.push(serde_json::from_str(line)?);
            }
        }
        Ok(series)
    }

    pub fn load_wire(&self, run_id: &str, wire: &str) -> ResultsResult<WireSeries> {
        self.load_series(run_id)?
            .into_iter()
            .find(|s| s.wire == wire)
            .ok_or_else(|| ResultsError::WireNotFound {
                run_id: run_id.to_string(),
                wire: wire.to_string(),
            })
    }

    /// Stored runs of `scenario_id`, oldest first.
    pub fn list_runs(&self, scenario_id: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id)
                    && manifest.scenario_id == scenario_id
                {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

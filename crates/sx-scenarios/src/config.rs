//! YAML run configuration files.
//!
//! ```yaml
//! scenario: codec-manchester
//! duration_s: 2.2
//! params:
//!   baud_rate: 10
//!   bitstream: "0110"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, ScenarioResult};
use crate::params::{ParamSet, ParamValue};
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub scenario: String,
    /// Falls back to the scenario's default duration when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

impl RunConfig {
    /// Check the scenario exists, the duration is usable and every
    /// parameter resolves against the scenario's schema.
    pub fn validate(&self, registry: &Registry) -> ScenarioResult<ParamSet> {
        let def = registry.get(&self.scenario)?;
        if let Some(duration) = self.duration_s {
            if !(duration.is_finite() && duration > 0.0) {
                return Err(ScenarioError::InvalidValue {
                    name: "duration_s".into(),
                    reason: format!("must be positive and finite, got {duration}"),
                });
            }
        }
        def.resolve(&self.params)
    }

    pub fn duration_or_default(&self, registry: &Registry) -> ScenarioResult<f64> {
        match self.duration_s {
            Some(d) => Ok(d),
            None => Ok(registry.get(&self.scenario)?.default_duration_s),
        }
    }
}

pub fn load_yaml(path: &Path) -> ScenarioResult<RunConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: RunConfig = serde_yaml::from_str(&content)?;
    config.validate(&Registry::builtin())?;
    Ok(config)
}

pub fn save_yaml(path: &Path, config: &RunConfig) -> ScenarioResult<()> {
    config.validate(&Registry::builtin())?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

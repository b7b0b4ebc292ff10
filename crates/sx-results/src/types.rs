//! Result data types.

use serde::{Deserialize, Serialize};
use sx_scenarios::ParamSet;

pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_id: String,
    pub timestamp: String,
    pub engine_version: String,
    pub params: ParamSet,
    pub dt_s: f64,
    pub duration_s: f64,
    pub steps_requested: usize,
    pub steps_completed: usize,
    /// False when the run was cancelled before all steps completed.
    pub complete: bool,
    /// Wire names in registration order; the input wire comes first.
    pub wires: Vec<String>,
}

impl RunManifest {
    pub fn stamp() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

/// Recorded history of one wire.
///
/// Non-finite samples are stored as JSON `null` and read back as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSeries {
    pub wire: String,
    pub time_s: Vec<f64>,
    #[serde(with = "nullable_floats")]
    pub value: Vec<f64>,
}

impl WireSeries {
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time_s.iter().copied().zip(self.value.iter().copied())
    }
}

mod nullable_floats {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mapped: Vec<Option<f64>> = values
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect();
        mapped.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let mapped = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(mapped.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};
use sx_scenarios::ParamSet;

/// Run id over everything that determines a run's output.
///
/// Parameters are hashed through their JSON form; `ParamSet` keeps them in
/// name order, so equal sets always hash equally.
pub fn compute_run_id(
    scenario_id: &str,
    params: &ParamSet,
    duration_s: f64,
    engine_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(scenario_id.as_bytes());
    hasher.update([0u8]);

    let params_json = serde_json::to_string(params).unwrap_or_default();
    hasher.update(params_json.as_bytes());
    hasher.update([0u8]);

    hasher.update(duration_s.to_bits().to_le_bytes());
    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

use sx_engine::SimError;
use sx_stages::StageError;

use crate::params::ParamKind;

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error("Unknown scenario: {id}")]
    UnknownScenario { id: String },

    #[error("Unknown parameter '{name}' for scenario {scenario}")]
    UnknownParam { scenario: String, name: String },

    #[error("Parameter '{name}' expects {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: ParamKind,
        found: String,
    },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

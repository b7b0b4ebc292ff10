//! sx-scenarios: built-in simplexsim circuits and their run configuration.
//!
//! A scenario is a named recipe that turns a resolved parameter set into a
//! ready-to-run [`sx_engine::Simulation`].

pub mod config;
pub mod error;
pub mod layout;
pub mod line_code;
pub mod params;
pub mod registry;

pub use config::{RunConfig, load_yaml, save_yaml};
pub use error::{ScenarioError, ScenarioResult};
pub use line_code::LineCode;
pub use params::{ParamKind, ParamSet, ParamSpec, ParamValue, parse_assignment};
pub use registry::{BuiltScenario, Recipe, Registry, ScenarioDef};

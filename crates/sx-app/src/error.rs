//! Error types for the sx-app service layer.

/// Application error type that wraps errors from the backend crates and
/// gives front ends one error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sx-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<sx_scenarios::ScenarioError> for AppError {
    fn from(err: sx_scenarios::ScenarioError) -> Self {
        AppError::Scenario(err.to_string())
    }
}

impl From<sx_engine::SimError> for AppError {
    fn from(err: sx_engine::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<sx_results::ResultsError> for AppError {
    fn from(err: sx_results::ResultsError) -> Self {
        match err {
            sx_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    BuildingScenario,
    CheckingCache,
    LoadingCachedResult,
    Running,
    SavingResults,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimProgress {
    pub sim_time_s: f64,
    pub step: usize,
    pub steps: usize,
    pub fraction_complete: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub sim: Option<SimProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            sim: None,
        }
    }
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::BuildingScenario => "Building scenario",
            RunStage::CheckingCache => "Checking cache",
            RunStage::LoadingCachedResult => "Loading cached result",
            RunStage::Running => "Running",
            RunStage::SavingResults => "Saving results",
            RunStage::Cancelled => "Cancelled",
            RunStage::Completed => "Completed",
        }
    }
}

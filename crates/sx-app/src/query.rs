//! Query helpers for extracting data from loaded runs.

use sx_results::{RunManifest, WireSeries};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub struct WireSummary {
    pub name: String,
    pub samples: usize,
    /// Over finite samples only; `None` when there are none.
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub last: Option<f64>,
}

/// Summary of a run's time range and recorded wires.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub scenario_id: String,
    pub time_range: (f64, f64),
    pub steps_completed: usize,
    pub complete: bool,
    pub wires: Vec<WireSummary>,
}

fn summarize_wire(series: &WireSeries) -> WireSummary {
    let finite: Vec<f64> = series.value.iter().copied().filter(|v| v.is_finite()).collect();
    let mean = (!finite.is_empty()).then(|| finite.iter().sum::<f64>() / finite.len() as f64);
    WireSummary {
        name: series.wire.clone(),
        samples: series.len(),
        min: finite.iter().copied().reduce(f64::min),
        max: finite.iter().copied().reduce(f64::max),
        mean,
        last: series.value.last().copied(),
    }
}

pub fn get_run_summary(manifest: &RunManifest, series: &[WireSeries]) -> AppResult<RunSummary> {
    let input = series
        .first()
        .ok_or_else(|| AppError::InvalidInput("No series in run".to_string()))?;

    let t_min = input.time_s.first().copied().unwrap_or(0.0);
    let t_max = input.time_s.last().copied().unwrap_or(0.0);

    Ok(RunSummary {
        run_id: manifest.run_id.clone(),
        scenario_id: manifest.scenario_id.clone(),
        time_range: (t_min, t_max),
        steps_completed: manifest.steps_completed,
        complete: manifest.complete,
        wires: series.iter().map(summarize_wire).collect(),
    })
}

pub fn list_wire_names(series: &[WireSeries]) -> Vec<String> {
    series.iter().map(|s| s.wire.clone()).collect()
}

/// `(time_s, value)` pairs of one wire.
pub fn extract_wire_series(series: &[WireSeries], wire: &str) -> AppResult<Vec<(f64, f64)>> {
    series
        .iter()
        .find(|s| s.wire == wire)
        .map(|s| s.samples().collect())
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Unknown wire: {} (available: {})",
                wire,
                list_wire_names(series).join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<WireSeries> {
        vec![
            WireSeries {
                wire: "In".into(),
                time_s: vec![0.0, 0.5, 1.0],
                value: vec![1.0, 3.0, f64::NAN],
            },
            WireSeries {
                wire: "Out".into(),
                time_s: vec![],
                value: vec![],
            },
        ]
    }

    #[test]
    fn wire_summary_skips_non_finite() {
        let s = summarize_wire(&series()[0]);
        assert_eq!(s.samples, 3);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(3.0));
        assert_eq!(s.mean, Some(2.0));
        assert!(s.last.is_some_and(f64::is_nan));

        let empty = summarize_wire(&series()[1]);
        assert_eq!(empty.mean, None);
        assert_eq!(empty.last, None);
    }

    #[test]
    fn extract_reports_available_wires() {
        let pairs = extract_wire_series(&series(), "In").unwrap();
        assert_eq!(pairs[1], (0.5, 3.0));
        let err = extract_wire_series(&series(), "Nope").unwrap_err();
        assert!(err.to_string().contains("In, Out"));
    }
}

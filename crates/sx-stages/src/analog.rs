//! Analog-to-analog modulators and demodulators (AM, FM, PM).

use std::f64::consts::{FRAC_PI_2, TAU};

use sx_core::{Real, ensure_finite, ensure_positive};
use sx_engine::Component;

use crate::common::Ema;
use crate::error::StageResult;

const AM_ENVELOPE_ALPHA: Real = 0.02;
const FM_SMOOTHING_ALPHA: Real = 0.05;

/// Default modulation index for AM.
pub const DEFAULT_MODULATION_INDEX: Real = 0.5;
/// Default phase deviation for PM, in radians per unit message.
pub const DEFAULT_PHASE_DEVIATION: Real = FRAC_PI_2;

/// `(1 + m·x) · cos(2π fc t)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AmModulator {
    carrier_freq: Real,
    modulation_index: Real,
}

impl AmModulator {
    pub fn new(carrier_freq: Real, modulation_index: Real) -> StageResult<Self> {
        Ok(Self {
            carrier_freq: ensure_positive(carrier_freq, "carrier_freq")?,
            modulation_index: ensure_finite(modulation_index, "modulation_index")?,
        })
    }
}

impl Component for AmModulator {
    fn kind(&self) -> &'static str {
        "AmModulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let envelope = 1.0 + self.modulation_index * input;
        Some(envelope * (TAU * self.carrier_freq * time).cos())
    }
}

/// Envelope detector: low-passes `|x|` and undoes the AM scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct AmDemodulator {
    modulation_index: Real,
    envelope: Ema,
}

impl AmDemodulator {
    pub fn new(modulation_index: Real) -> StageResult<Self> {
        Ok(Self {
            modulation_index: ensure_positive(modulation_index, "modulation_index")?,
            envelope: Ema::new(AM_ENVELOPE_ALPHA, 1.0),
        })
    }
}

impl Component for AmDemodulator {
    fn kind(&self) -> &'static str {
        "AmDemodulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let envelope = self.envelope.update(time, input.abs());
        Some((envelope - 1.0) / self.modulation_index)
    }

    fn reset(&mut self) {
        self.envelope.reset();
    }
}

/// `cos(φ)` where φ integrates `2π (fc + kf·x)` over logical time.
#[derive(Debug, Clone, PartialEq)]
pub struct FmModulator {
    carrier_freq: Real,
    freq_deviation: Real,
    phase: Real,
    // Phase and time as of the previous distinct tick.
    base_phase: Real,
    base_time: Real,
    current_time: Option<Real>,
}

impl FmModulator {
    pub fn new(carrier_freq: Real, freq_deviation: Real) -> StageResult<Self> {
        Ok(Self {
            carrier_freq: ensure_positive(carrier_freq, "carrier_freq")?,
            freq_deviation: ensure_finite(freq_deviation, "freq_deviation")?,
            phase: 0.0,
            base_phase: 0.0,
            base_time: 0.0,
            current_time: None,
        })
    }
}

impl Component for FmModulator {
    fn kind(&self) -> &'static str {
        "FmModulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        if self.current_time != Some(time) {
            if let Some(previous) = self.current_time {
                self.base_time = previous;
            }
            self.base_phase = self.phase;
            self.current_time = Some(time);
        }

        let dt = time - self.base_time;
        self.phase = self.base_phase;
        if dt > 0.0 {
            let freq = self.carrier_freq + self.freq_deviation * input;
            self.phase += TAU * freq * dt;
        }
        Some(self.phase.cos())
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.base_phase = 0.0;
        self.base_time = 0.0;
        self.current_time = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CrossingTrack {
    prev_value: Real,
    last_crossing: Real,
    inst_freq: Real,
    smoothed: Real,
}

/// Rising zero-crossing frequency estimator, smoothed and normalised by
/// the frequency deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct FmDemodulator {
    carrier_freq: Real,
    freq_deviation: Real,
    track: CrossingTrack,
    base: CrossingTrack,
    current_time: Option<Real>,
}

impl FmDemodulator {
    pub fn new(carrier_freq: Real, freq_deviation: Real) -> StageResult<Self> {
        let carrier_freq = ensure_positive(carrier_freq, "carrier_freq")?;
        let initial = Self::initial_track(carrier_freq);
        Ok(Self {
            carrier_freq,
            freq_deviation: ensure_positive(freq_deviation, "freq_deviation")?,
            track: initial,
            base: initial,
            current_time: None,
        })
    }

    fn initial_track(carrier_freq: Real) -> CrossingTrack {
        CrossingTrack {
            prev_value: 0.0,
            last_crossing: 0.0,
            inst_freq: carrier_freq,
            smoothed: 0.0,
        }
    }
}

impl Component for FmDemodulator {
    fn kind(&self) -> &'static str {
        "FmDemodulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        if self.current_time != Some(time) {
            self.base = self.track;
            self.current_time = Some(time);
        }

        let mut track = self.base;
        if track.prev_value <= 0.0 && input > 0.0 {
            if track.last_crossing > 0.0 {
                let period = time - track.last_crossing;
                if period > 0.0 {
                    track.inst_freq = 1.0 / period;
                }
            }
            track.last_crossing = time;
        }

        let normalized = (track.inst_freq - self.carrier_freq) / self.freq_deviation;
        track.smoothed = FM_SMOOTHING_ALPHA * normalized + (1.0 - FM_SMOOTHING_ALPHA) * track.smoothed;
        track.prev_value = input;

        self.track = track;
        Some(track.smoothed)
    }

    fn reset(&mut self) {
        self.track = Self::initial_track(self.carrier_freq);
        self.base = self.track;
        self.current_time = None;
    }
}

/// `cos(2π fc t + kp·x)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PmModulator {
    carrier_freq: Real,
    phase_deviation: Real,
}

impl PmModulator {
    pub fn new(carrier_freq: Real, phase_deviation: Real) -> StageResult<Self> {
        Ok(Self {
            carrier_freq: ensure_positive(carrier_freq, "carrier_freq")?,
            phase_deviation: ensure_finite(phase_deviation, "phase_deviation")?,
        })
    }
}

impl Component for PmModulator {
    fn kind(&self) -> &'static str {
        "PmModulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        Some((TAU * self.carrier_freq * time + self.phase_deviation * input).cos())
    }
}

/// Coherent detector: the phase of `x` against the carrier reference,
/// divided by the phase deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct PmDemodulator {
    carrier_freq: Real,
    phase_deviation: Real,
}

impl PmDemodulator {
    pub fn new(carrier_freq: Real, phase_deviation: Real) -> StageResult<Self> {
        Ok(Self {
            carrier_freq: ensure_positive(carrier_freq, "carrier_freq")?,
            phase_deviation: ensure_positive(phase_deviation, "phase_deviation")?,
        })
    }
}

impl Component for PmDemodulator {
    fn kind(&self) -> &'static str {
        "PmDemodulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let angle = TAU * self.carrier_freq * time;
        let phase = (input * angle.sin()).atan2(input * angle.cos());
        Some(phase / self.phase_deviation)
    }
}

//! Digital-to-analog keying (ASK, FSK, PSK) and the matching detectors.
//!
//! Demodulators accumulate over one bit and decide that bit when the next
//! one starts, so their output lags the input by one bit period.

use std::f64::consts::{PI, TAU};

use sx_core::{Real, ensure_positive};
use sx_engine::Component;

use crate::common::{BitClock, WindowMean, is_one};
use crate::error::StageResult;

/// Mean rectified amplitude above which an ASK bit reads as 1.
const ASK_THRESHOLD: Real = 0.3;

/// Carrier on for 1, off for 0: `sin(2π fc t)` or silence.
#[derive(Debug, Clone, PartialEq)]
pub struct AskModulator {
    carrier_freq: Real,
}

impl AskModulator {
    pub fn new(carrier_freq: Real) -> StageResult<Self> {
        Ok(Self {
            carrier_freq: ensure_positive(carrier_freq, "carrier_freq")?,
        })
    }
}

impl Component for AskModulator {
    fn kind(&self) -> &'static str {
        "AskModulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let amplitude = if is_one(input) { 1.0 } else { 0.0 };
        Some(amplitude * (TAU * self.carrier_freq * time).sin())
    }
}

/// `sin(2π f t)` with `f1` for 1 and `f0` for 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FskModulator {
    freq_0: Real,
    freq_1: Real,
}

impl FskModulator {
    pub fn new(freq_0: Real, freq_1: Real) -> StageResult<Self> {
        Ok(Self {
            freq_0: ensure_positive(freq_0, "freq_0")?,
            freq_1: ensure_positive(freq_1, "freq_1")?,
        })
    }
}

impl Component for FskModulator {
    fn kind(&self) -> &'static str {
        "FskModulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let freq = if is_one(input) { self.freq_1 } else { self.freq_0 };
        Some((TAU * freq * time).sin())
    }
}

/// Binary PSK: phase 0 for 1, π for 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PskModulator {
    carrier_freq: Real,
}

impl PskModulator {
    pub fn new(carrier_freq: Real) -> StageResult<Self> {
        Ok(Self {
            carrier_freq: ensure_positive(carrier_freq, "carrier_freq")?,
        })
    }
}

impl Component for PskModulator {
    fn kind(&self) -> &'static str {
        "PskModulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let phase = if is_one(input) { 0.0 } else { PI };
        Some((TAU * self.carrier_freq * time + phase).sin())
    }
}

/// Per-bit averaging shared by the ASK and PSK detectors.
#[derive(Debug, Clone, PartialEq)]
struct BitAverager {
    clock: BitClock,
    window: WindowMean,
    last_bit: i64,
    decided: Real,
}

impl BitAverager {
    fn new(baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            window: WindowMean::default(),
            last_bit: -1,
            decided: 0.0,
        })
    }

    fn tick(&mut self, time: Real, sample: Real, decide: impl Fn(Real) -> bool) -> Real {
        let index = self.clock.index(time);
        if index > self.last_bit {
            if let Some(mean) = self.window.mean() {
                self.decided = if decide(mean) { 1.0 } else { 0.0 };
            }
            self.window.clear();
            self.last_bit = index;
        }
        self.window.push(time, sample);
        self.decided
    }

    fn reset(&mut self) {
        self.window.clear();
        self.last_bit = -1;
        self.decided = 0.0;
    }
}

/// Envelope detector: mean `|x|` over a bit above 0.3 is 1.
#[derive(Debug, Clone, PartialEq)]
pub struct AskDemodulator(BitAverager);

impl AskDemodulator {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        BitAverager::new(baud_rate).map(Self)
    }
}

impl Component for AskDemodulator {
    fn kind(&self) -> &'static str {
        "AskDemodulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        Some(self.0.tick(time, input.abs(), |mean| mean > ASK_THRESHOLD))
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

/// Coherent detector: positive mean correlation with `sin(2π fc t)` is 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PskDemodulator {
    carrier_freq: Real,
    averager: BitAverager,
}

impl PskDemodulator {
    pub fn new(carrier_freq: Real, baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            carrier_freq: ensure_positive(carrier_freq, "carrier_freq")?,
            averager: BitAverager::new(baud_rate)?,
        })
    }
}

impl Component for PskDemodulator {
    fn kind(&self) -> &'static str {
        "PskDemodulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let reference = (TAU * self.carrier_freq * time).sin();
        Some(self.averager.tick(time, input * reference, |mean| mean > 0.0))
    }

    fn reset(&mut self) {
        self.averager.reset();
    }
}

/// Zero-crossing counter: more crossings than the midpoint of `f0` and
/// `f1` would give reads as 1.
#[derive(Debug, Clone, PartialEq)]
pub struct FskDemodulator {
    clock: BitClock,
    threshold: Real,
    // Last value of the previous distinct tick.
    prev_value: Real,
    last_value: Real,
    current_time: Option<Real>,
    crossings: u32,
    counted: bool,
    last_bit: i64,
    decided: Real,
}

impl FskDemodulator {
    pub fn new(freq_0: Real, freq_1: Real, baud_rate: Real) -> StageResult<Self> {
        let freq_0 = ensure_positive(freq_0, "freq_0")?;
        let freq_1 = ensure_positive(freq_1, "freq_1")?;
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            threshold: (freq_0 + freq_1) / 2.0,
            prev_value: 0.0,
            last_value: 0.0,
            current_time: None,
            crossings: 0,
            counted: false,
            last_bit: -1,
            decided: 0.0,
        })
    }
}

impl Component for FskDemodulator {
    fn kind(&self) -> &'static str {
        "FskDemodulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        if self.current_time != Some(time) {
            self.prev_value = self.last_value;
            self.current_time = Some(time);
            self.counted = false;
        }

        let index = self.clock.index(time);
        if index > self.last_bit {
            if self.last_bit >= 0 {
                let estimated = self.crossings as Real / (2.0 * self.clock.period());
                self.decided = if estimated > self.threshold { 1.0 } else { 0.0 };
            }
            self.crossings = 0;
            self.last_bit = index;
        }

        let crossed = self.prev_value * input < 0.0;
        match (crossed, self.counted) {
            (true, false) => self.crossings += 1,
            (false, true) => self.crossings -= 1,
            _ => {}
        }
        self.counted = crossed;
        self.last_value = input;
        Some(self.decided)
    }

    fn reset(&mut self) {
        self.prev_value = 0.0;
        self.last_value = 0.0;
        self.current_time = None;
        self.crossings = 0;
        self.counted = false;
        self.last_bit = -1;
        self.decided = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        modulator: &mut dyn Component,
        demodulator: &mut dyn Component,
        bits: &[u8],
        baud: Real,
        dt: Real,
    ) -> Vec<Real> {
        let per_bit = (1.0 / baud / dt).round() as usize;
        let mut decided = Vec::new();
        for step in 0..=(bits.len() * per_bit) {
            let t = step as Real * dt;
            let bit = bits.get(step / per_bit).copied().unwrap_or(0) as Real;
            let line = modulator.tick(t, bit).unwrap();
            let out = demodulator.tick(t, line).unwrap();
            // Sample just after each boundary, where the previous bit is decided.
            if step > 0 && step % per_bit == 1 {
                decided.push(out);
            }
        }
        decided
    }

    #[test]
    fn ask_round_trip() {
        let mut m = AskModulator::new(20.0).unwrap();
        let mut d = AskDemodulator::new(5.0).unwrap();
        let out = run(&mut m, &mut d, &[1, 0, 1, 1], 5.0, 1e-3);
        assert_eq!(out, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn psk_round_trip() {
        let mut m = PskModulator::new(20.0).unwrap();
        let mut d = PskDemodulator::new(20.0, 5.0).unwrap();
        let out = run(&mut m, &mut d, &[1, 0, 0, 1], 5.0, 1e-3);
        assert_eq!(out, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn fsk_round_trip() {
        let mut m = FskModulator::new(10.0, 25.0).unwrap();
        let mut d = FskDemodulator::new(10.0, 25.0, 5.0).unwrap();
        let out = run(&mut m, &mut d, &[0, 1, 1, 0], 5.0, 1e-3);
        assert_eq!(out, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn fsk_counts_each_crossing_once_per_time() {
        let mut d = FskDemodulator::new(10.0, 25.0, 1.0).unwrap();
        d.tick(0.1, 1.0);
        d.tick(0.2, -1.0);
        d.tick(0.2, -1.0);
        assert_eq!(d.crossings, 1);
        // A retick at the same time with a different value re-decides.
        d.tick(0.2, 1.0);
        assert_eq!(d.crossings, 0);
    }

    #[test]
    fn keyers_reject_bad_carriers() {
        assert!(AskModulator::new(0.0).is_err());
        assert!(FskModulator::new(10.0, -1.0).is_err());
        assert!(PskDemodulator::new(20.0, 0.0).is_err());
    }
}

//! Line decoders recovering a logic level from line-coded signals.
//!
//! Decoders sample inside fixed windows of each bit and hold the last
//! decided bit in between. All of them start out holding 0.

use sx_core::Real;
use sx_engine::Component;

use crate::common::BitClock;
use crate::error::StageResult;

const SAMPLE_LO: Real = 0.5;
const SAMPLE_HI: Real = 0.6;
const LATE_LO: Real = 0.75;
const LATE_HI: Real = 0.85;

fn bit(value: bool) -> Real {
    if value { 1.0 } else { 0.0 }
}

/// Recovers NRZ-L: a positive level is 0, anything else is 1.
#[derive(Debug, Clone, PartialEq)]
pub struct NrzlDecoder {
    clock: BitClock,
    last: Real,
}

impl NrzlDecoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            last: 0.0,
        })
    }
}

impl Component for NrzlDecoder {
    fn kind(&self) -> &'static str {
        "NrzlDecoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        if self.clock.in_window(time, SAMPLE_LO, SAMPLE_HI) {
            self.last = bit(input <= 0.0);
        }
        Some(self.last)
    }

    fn reset(&mut self) {
        self.last = 0.0;
    }
}

/// Recovers NRZ-I: a level change from the previous bit is 1.
#[derive(Debug, Clone, PartialEq)]
pub struct NrziDecoder {
    clock: BitClock,
    previous_level: Real,
    last_bit: i64,
    last: Real,
}

impl NrziDecoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            previous_level: -1.0,
            last_bit: -1,
            last: 0.0,
        })
    }
}

impl Component for NrziDecoder {
    fn kind(&self) -> &'static str {
        "NrziDecoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let index = self.clock.index(time);
        if index > self.last_bit && self.clock.past(time, SAMPLE_LO) {
            let level = if input > 0.0 { 1.0 } else { -1.0 };
            self.last = bit(level != self.previous_level);
            self.previous_level = level;
            self.last_bit = index;
        }
        Some(self.last)
    }

    fn reset(&mut self) {
        self.previous_level = -1.0;
        self.last_bit = -1;
        self.last = 0.0;
    }
}

/// Ternary decoding shared by Bipolar-AMI and Pseudoternary.
#[derive(Debug, Clone, PartialEq)]
struct PulseDetector {
    clock: BitClock,
    last: Real,
}

impl PulseDetector {
    fn new(baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            last: 0.0,
        })
    }

    /// `mark` is the logic value carried by a pulse.
    fn tick(&mut self, time: Real, input: Real, mark: bool) -> Real {
        if self.clock.in_window(time, SAMPLE_LO, SAMPLE_HI) {
            let pulse = input.abs() > 0.5;
            self.last = bit(pulse == mark);
        }
        self.last
    }
}

/// Recovers Bipolar-AMI: any pulse is 1, no signal is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct BipolarAmiDecoder(PulseDetector);

impl BipolarAmiDecoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        PulseDetector::new(baud_rate).map(Self)
    }
}

impl Component for BipolarAmiDecoder {
    fn kind(&self) -> &'static str {
        "BipolarAmiDecoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        Some(self.0.tick(time, input, true))
    }

    fn reset(&mut self) {
        self.0.last = 0.0;
    }
}

/// Recovers Pseudoternary: any pulse is 0, no signal is 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoternaryDecoder(PulseDetector);

impl PseudoternaryDecoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        PulseDetector::new(baud_rate).map(Self)
    }
}

impl Component for PseudoternaryDecoder {
    fn kind(&self) -> &'static str {
        "PseudoternaryDecoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        Some(self.0.tick(time, input, false))
    }

    fn reset(&mut self) {
        self.0.last = 0.0;
    }
}

/// Recovers Manchester by comparing the two halves of each bit.
///
/// Samples the first half at a quarter bit and decides late in the second
/// half: low-then-high is 1, high-then-low is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ManchesterDecoder {
    clock: BitClock,
    last_bit: i64,
    first_half: Option<Real>,
    last: Real,
}

impl ManchesterDecoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            last_bit: -1,
            first_half: None,
            last: 0.0,
        })
    }
}

impl Component for ManchesterDecoder {
    fn kind(&self) -> &'static str {
        "ManchesterDecoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let index = self.clock.index(time);
        if index > self.last_bit {
            self.last_bit = index;
            self.first_half = None;
        }
        if self.first_half.is_none() && self.clock.past(time, 0.25) {
            self.first_half = Some(input);
        }
        if let Some(first) = self.first_half {
            if self.clock.in_window(time, LATE_LO, LATE_HI) {
                if first < 0.0 && input > 0.0 {
                    self.last = 1.0;
                } else if first > 0.0 && input < 0.0 {
                    self.last = 0.0;
                }
            }
        }
        Some(self.last)
    }

    fn reset(&mut self) {
        self.last_bit = -1;
        self.first_half = None;
        self.last = 0.0;
    }
}

/// Recovers Differential Manchester: no transition at the start of a bit
/// is 1, a transition is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialManchesterDecoder {
    clock: BitClock,
    last_bit: i64,
    previous_second_half: Real,
    last: Real,
}

impl DifferentialManchesterDecoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            last_bit: -1,
            previous_second_half: -1.0,
            last: 0.0,
        })
    }
}

impl Component for DifferentialManchesterDecoder {
    fn kind(&self) -> &'static str {
        "DifferentialManchesterDecoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let index = self.clock.index(time);
        if index > self.last_bit && self.clock.past(time, 0.25) {
            let same = (input > 0.0) == (self.previous_second_half > 0.0);
            self.last = bit(same);
            self.last_bit = index;
        }
        if self.clock.in_window(time, LATE_LO, LATE_HI) {
            self.previous_second_half = input;
        }
        Some(self.last)
    }

    fn reset(&mut self) {
        self.last_bit = -1;
        self.previous_second_half = -1.0;
        self.last = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nrzl_samples_inside_window_only() {
        let mut dec = NrzlDecoder::new(1.0).unwrap();
        assert_eq!(dec.tick(0.1, -1.0), Some(0.0));
        assert_eq!(dec.tick(0.55, -1.0), Some(1.0));
        assert_eq!(dec.tick(0.9, 1.0), Some(1.0));
        assert_eq!(dec.tick(1.55, 1.0), Some(0.0));
        dec.reset();
        assert_eq!(dec.tick(0.9, -1.0), Some(0.0));
    }

    #[test]
    fn nrzi_detects_changes() {
        let mut dec = NrziDecoder::new(1.0).unwrap();
        let levels = [-1.0, 1.0, -1.0, -1.0, 1.0];
        let bits: Vec<Real> = levels
            .iter()
            .enumerate()
            .map(|(i, v)| dec.tick(i as Real + 0.6, *v).unwrap())
            .collect();
        assert_eq!(bits, vec![0.0, 1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn ternary_decoders_are_complementary() {
        let mut ami = BipolarAmiDecoder::new(1.0).unwrap();
        let mut pseudo = PseudoternaryDecoder::new(1.0).unwrap();
        for (i, v) in [1.0, 0.0, -1.0].into_iter().enumerate() {
            let t = i as Real + 0.55;
            let a = ami.tick(t, v).unwrap();
            let p = pseudo.tick(t, v).unwrap();
            assert_eq!(a + p, 1.0);
        }
    }

    #[test]
    fn manchester_decides_late_in_bit() {
        let mut dec = ManchesterDecoder::new(1.0).unwrap();
        assert_eq!(dec.tick(0.3, -1.0), Some(0.0));
        assert_eq!(dec.tick(0.8, 1.0), Some(1.0));
        assert_eq!(dec.tick(1.3, 1.0), Some(1.0));
        assert_eq!(dec.tick(1.8, -1.0), Some(0.0));
    }

    #[test]
    fn differential_manchester_compares_with_previous_bit() {
        let mut dec = DifferentialManchesterDecoder::new(1.0).unwrap();
        // bit 0 starts high after an assumed low end: transition, so 0.
        assert_eq!(dec.tick(0.3, 1.0), Some(0.0));
        assert_eq!(dec.tick(0.8, -1.0), Some(0.0));
        // bit 1 starts low, same as the previous end: 1.
        assert_eq!(dec.tick(1.3, -1.0), Some(1.0));
        dec.reset();
        assert_eq!(dec.tick(0.3, -1.0), Some(1.0));
    }
}

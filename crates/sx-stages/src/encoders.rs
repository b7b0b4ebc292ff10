//! Digital-to-digital line encoders.
//!
//! Every encoder reads a logic level (above 0.5 is one) and emits line
//! levels of ±1 (or 0 for the ternary codes).

use sx_core::Real;
use sx_engine::Component;

use crate::common::{BitClock, is_one};
use crate::error::StageResult;

/// Non-Return-to-Zero Level: 0 maps to the high level, 1 to the low level.
#[derive(Debug, Clone, PartialEq)]
pub struct NrzlEncoder {
    high: Real,
    low: Real,
}

impl NrzlEncoder {
    pub fn new() -> Self {
        Self::with_levels(1.0, -1.0)
    }

    pub fn with_levels(high: Real, low: Real) -> Self {
        Self { high, low }
    }
}

impl Default for NrzlEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for NrzlEncoder {
    fn kind(&self) -> &'static str {
        "NrzlEncoder"
    }

    fn tick(&mut self, _time: Real, input: Real) -> Option<Real> {
        Some(if is_one(input) { self.low } else { self.high })
    }
}

/// Non-Return-to-Zero Inverted: a 1 flips the level at the start of its bit,
/// a 0 keeps it. Starts at the low level.
#[derive(Debug, Clone, PartialEq)]
pub struct NrziEncoder {
    clock: BitClock,
    high: Real,
    low: Real,
    level: Real,
    last_bit: i64,
}

impl NrziEncoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        Self::with_levels(baud_rate, 1.0, -1.0)
    }

    pub fn with_levels(baud_rate: Real, high: Real, low: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            high,
            low,
            level: low,
            last_bit: -1,
        })
    }
}

impl Component for NrziEncoder {
    fn kind(&self) -> &'static str {
        "NrziEncoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let bit = self.clock.index(time);
        if bit > self.last_bit {
            if is_one(input) {
                self.level = if self.level == self.low { self.high } else { self.low };
            }
            self.last_bit = bit;
        }
        Some(self.level)
    }

    fn reset(&mut self) {
        self.level = self.low;
        self.last_bit = -1;
    }
}

/// Manchester: a 1 is low then high, a 0 is high then low.
#[derive(Debug, Clone, PartialEq)]
pub struct ManchesterEncoder {
    clock: BitClock,
}

impl ManchesterEncoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
        })
    }
}

impl Component for ManchesterEncoder {
    fn kind(&self) -> &'static str {
        "ManchesterEncoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let first_half = self.clock.first_half(time);
        let level = match (is_one(input), first_half) {
            (true, true) | (false, false) => -1.0,
            (true, false) | (false, true) => 1.0,
        };
        Some(level)
    }
}

/// Differential Manchester: always a mid-bit transition; a 0 also
/// transitions at the start of the bit, a 1 does not.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialManchesterEncoder {
    clock: BitClock,
    previous_end: Real,
    start_level: Real,
    last_bit: i64,
}

impl DifferentialManchesterEncoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            previous_end: -1.0,
            start_level: -1.0,
            last_bit: -1,
        })
    }
}

impl Component for DifferentialManchesterEncoder {
    fn kind(&self) -> &'static str {
        "DifferentialManchesterEncoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let bit = self.clock.index(time);
        if bit > self.last_bit {
            self.start_level = if is_one(input) {
                self.previous_end
            } else {
                -self.previous_end
            };
            self.last_bit = bit;
        }

        let level = if self.clock.first_half(time) {
            self.start_level
        } else {
            -self.start_level
        };
        self.previous_end = level;
        Some(level)
    }

    fn reset(&mut self) {
        self.previous_end = -1.0;
        self.start_level = -1.0;
        self.last_bit = -1;
    }
}

/// Alternate-mark encoding shared by Bipolar-AMI and Pseudoternary.
#[derive(Debug, Clone, PartialEq)]
struct AlternateMark {
    clock: BitClock,
    last_polarity: Real,
    level: Real,
    last_bit: i64,
}

impl AlternateMark {
    fn new(baud_rate: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(baud_rate, "baud_rate")?,
            last_polarity: -1.0,
            level: 0.0,
            last_bit: -1,
        })
    }

    /// `mark` selects which logic value produces a pulse.
    fn tick(&mut self, time: Real, input: Real, mark: bool) -> Real {
        let bit = self.clock.index(time);
        if bit > self.last_bit {
            if is_one(input) == mark {
                self.level = -self.last_polarity;
                self.last_polarity = self.level;
            } else {
                self.level = 0.0;
            }
            self.last_bit = bit;
        }
        self.level
    }

    fn reset(&mut self) {
        self.last_polarity = -1.0;
        self.level = 0.0;
        self.last_bit = -1;
    }
}

/// Bipolar-AMI: 0 is no line signal, each 1 alternates +1 / -1 (first +1).
#[derive(Debug, Clone, PartialEq)]
pub struct BipolarAmiEncoder(AlternateMark);

impl BipolarAmiEncoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        AlternateMark::new(baud_rate).map(Self)
    }
}

impl Component for BipolarAmiEncoder {
    fn kind(&self) -> &'static str {
        "BipolarAmiEncoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        Some(self.0.tick(time, input, true))
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

/// Pseudoternary: 1 is no line signal, each 0 alternates +1 / -1 (first +1).
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoternaryEncoder(AlternateMark);

impl PseudoternaryEncoder {
    pub fn new(baud_rate: Real) -> StageResult<Self> {
        AlternateMark::new(baud_rate).map(Self)
    }
}

impl Component for PseudoternaryEncoder {
    fn kind(&self) -> &'static str {
        "PseudoternaryEncoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        Some(self.0.tick(time, input, false))
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

//! Analog-to-digital coders: delta modulation and PCM.

use sx_core::{Real, ensure_finite, ensure_positive};
use sx_engine::Component;

use crate::common::{BitClock, is_one};
use crate::error::{StageError, StageResult};

pub const DEFAULT_STEP_SIZE: Real = 0.1;
pub const DEFAULT_PCM_BITS: u32 = 4;
pub const MAX_PCM_BITS: u32 = 24;

/// Delta modulation: one bit per sample saying whether the input is above
/// the running staircase approximation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaEncoder {
    clock: BitClock,
    step: Real,
    approximation: Real,
    last_sample: i64,
    bit: Real,
}

impl DeltaEncoder {
    pub fn new(sample_rate: Real, step: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(sample_rate, "sample_rate")?,
            step: ensure_positive(step, "step_size")?,
            approximation: 0.0,
            last_sample: -1,
            bit: 0.0,
        })
    }
}

impl Component for DeltaEncoder {
    fn kind(&self) -> &'static str {
        "DeltaEncoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let sample = self.clock.index(time);
        if sample > self.last_sample {
            if input > self.approximation {
                self.bit = 1.0;
                self.approximation += self.step;
            } else {
                self.bit = 0.0;
                self.approximation -= self.step;
            }
            self.last_sample = sample;
        }
        Some(self.bit)
    }

    fn reset(&mut self) {
        self.approximation = 0.0;
        self.last_sample = -1;
        self.bit = 0.0;
    }
}

/// Rebuilds the staircase by stepping up on 1 and down on 0 once per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaDecoder {
    clock: BitClock,
    step: Real,
    value: Real,
    last_sample: i64,
}

impl DeltaDecoder {
    pub fn new(sample_rate: Real, step: Real) -> StageResult<Self> {
        Ok(Self {
            clock: BitClock::from_rate(sample_rate, "sample_rate")?,
            step: ensure_positive(step, "step_size")?,
            value: 0.0,
            last_sample: -1,
        })
    }
}

impl Component for DeltaDecoder {
    fn kind(&self) -> &'static str {
        "DeltaDecoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let sample = self.clock.index(time);
        if sample > self.last_sample {
            if is_one(input) {
                self.value += self.step;
            } else {
                self.value -= self.step;
            }
            self.last_sample = sample;
        }
        Some(self.value)
    }

    fn reset(&mut self) {
        self.value = 0.0;
        self.last_sample = -1;
    }
}

/// Quantiser settings shared by the PCM encoder and decoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcmFormat {
    pub n_bits: u32,
    pub v_min: Real,
    pub v_max: Real,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            n_bits: DEFAULT_PCM_BITS,
            v_min: -1.0,
            v_max: 1.0,
        }
    }
}

impl PcmFormat {
    fn validate(self) -> StageResult<Self> {
        if self.n_bits == 0 || self.n_bits > MAX_PCM_BITS {
            return Err(StageError::InvalidArg {
                what: "n_bits must be between 1 and 24",
            });
        }
        let v_min = ensure_finite(self.v_min, "v_min")?;
        let v_max = ensure_finite(self.v_max, "v_max")?;
        if v_max <= v_min {
            return Err(StageError::InvalidArg {
                what: "v_max must be greater than v_min",
            });
        }
        Ok(self)
    }

    fn max_code(&self) -> u32 {
        (1u32 << self.n_bits) - 1
    }

    /// Code for `value`, clamped into `[v_min, v_max]`.
    pub fn quantize(&self, value: Real) -> u32 {
        let clamped = value.clamp(self.v_min, self.v_max);
        let normalized = (clamped - self.v_min) / (self.v_max - self.v_min);
        (normalized * self.max_code() as Real) as u32
    }

    pub fn level(&self, code: u32) -> Real {
        let normalized = code as Real / self.max_code() as Real;
        self.v_min + normalized * (self.v_max - self.v_min)
    }
}

/// Samples once per sample period and serialises the code MSB first, one
/// bit per `sample_period / n_bits`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmEncoder {
    samples: BitClock,
    bits: BitClock,
    format: PcmFormat,
    code: u32,
    last_sample: i64,
}

impl PcmEncoder {
    pub fn new(sample_rate: Real, format: PcmFormat) -> StageResult<Self> {
        let format = format.validate()?;
        let samples = BitClock::from_rate(sample_rate, "sample_rate")?;
        let bits = BitClock::from_period(samples.period() / format.n_bits as Real, "bit_period")?;
        Ok(Self {
            samples,
            bits,
            format,
            code: 0,
            last_sample: -1,
        })
    }
}

impl Component for PcmEncoder {
    fn kind(&self) -> &'static str {
        "PcmEncoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let sample = self.samples.index(time);
        if sample > self.last_sample {
            self.code = self.format.quantize(input);
            self.last_sample = sample;
        }

        let offset = self.samples.phase(time);
        let bit_index = ((offset / self.bits.period()) as u32).min(self.format.n_bits - 1);
        let shift = self.format.n_bits - 1 - bit_index;
        Some(((self.code >> shift) & 1) as Real)
    }

    fn reset(&mut self) {
        self.code = 0;
        self.last_sample = -1;
    }
}

/// Shifts in one bit per bit period and emits the level once `n_bits` have
/// arrived, holding it until the next full code.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmDecoder {
    bits: BitClock,
    format: PcmFormat,
    code: u32,
    received: u32,
    last_bit: i64,
    value: Real,
}

impl PcmDecoder {
    pub fn new(sample_rate: Real, format: PcmFormat) -> StageResult<Self> {
        let format = format.validate()?;
        let samples = BitClock::from_rate(sample_rate, "sample_rate")?;
        Ok(Self {
            bits: BitClock::from_period(samples.period() / format.n_bits as Real, "bit_period")?,
            format,
            code: 0,
            received: 0,
            last_bit: -1,
            value: 0.0,
        })
    }
}

impl Component for PcmDecoder {
    fn kind(&self) -> &'static str {
        "PcmDecoder"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        let index = self.bits.index(time);
        if index > self.last_bit {
            self.code = (self.code << 1) | u32::from(is_one(input));
            self.received += 1;
            if self.received >= self.format.n_bits {
                self.value = self.format.level(self.code);
                self.code = 0;
                self.received = 0;
            }
            self.last_bit = index;
        }
        Some(self.value)
    }

    fn reset(&mut self) {
        self.code = 0;
        self.received = 0;
        self.last_bit = -1;
        self.value = 0.0;
    }
}

//! Timing and filtering helpers shared by the stages.

use sx_core::{Real, ensure_positive, period_index, period_phase};

use crate::error::StageResult;

/// Logic level decision used by every digital stage.
pub fn is_one(value: Real) -> bool {
    value > 0.5
}

/// Maps logical time onto fixed-length symbol periods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitClock {
    period: Real,
}

impl BitClock {
    /// Clock for `rate` symbols per second.
    pub fn from_rate(rate: Real, what: &'static str) -> StageResult<Self> {
        let rate = ensure_positive(rate, what)?;
        Ok(Self { period: 1.0 / rate })
    }

    /// Clock with an explicit symbol period.
    pub fn from_period(period: Real, what: &'static str) -> StageResult<Self> {
        Ok(Self {
            period: ensure_positive(period, what)?,
        })
    }

    pub fn period(&self) -> Real {
        self.period
    }

    /// Index of the symbol containing `time`.
    pub fn index(&self, time: Real) -> i64 {
        period_index(time, self.period)
    }

    /// Offset of `time` inside its symbol, in `[0, period)`.
    pub fn phase(&self, time: Real) -> Real {
        period_phase(time, self.period)
    }

    /// Whether `time` lies in the first half of its symbol.
    pub fn first_half(&self, time: Real) -> bool {
        self.phase(time) < self.period / 2.0
    }

    /// Whether `time` lies in `[lo, hi)` fractions of its symbol.
    pub fn in_window(&self, time: Real, lo: Real, hi: Real) -> bool {
        let phase = self.phase(time);
        phase >= self.period * lo && phase < self.period * hi
    }

    /// Whether `time` is at or past `fraction` of its symbol.
    pub fn past(&self, time: Real, fraction: Real) -> bool {
        self.phase(time) >= self.period * fraction
    }
}

/// Exponential moving average that folds in one sample per distinct time.
///
/// Repeated updates at the same time replace that time's sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    alpha: Real,
    initial: Real,
    value: Real,
    base: Real,
    last_time: Option<Real>,
}

impl Ema {
    pub fn new(alpha: Real, initial: Real) -> Self {
        Self {
            alpha,
            initial,
            value: initial,
            base: initial,
            last_time: None,
        }
    }

    pub fn update(&mut self, time: Real, sample: Real) -> Real {
        if self.last_time != Some(time) {
            self.base = self.value;
            self.last_time = Some(time);
        }
        self.value = self.alpha * sample + (1.0 - self.alpha) * self.base;
        self.value
    }

    pub fn value(&self) -> Real {
        self.value
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.alpha, self.initial);
    }
}

/// Running mean over one symbol, one sample per distinct time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowMean {
    sum: Real,
    count: usize,
    last: Option<(Real, Real)>,
}

impl WindowMean {
    pub fn push(&mut self, time: Real, sample: Real) {
        match self.last {
            Some((t, prev)) if t == time => self.sum += sample - prev,
            _ => {
                self.sum += sample;
                self.count += 1;
            }
        }
        self.last = Some((time, sample));
    }

    /// Mean of the window, `None` when empty.
    pub fn mean(&self) -> Option<Real> {
        (self.count > 0).then(|| self.sum / self.count as Real)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

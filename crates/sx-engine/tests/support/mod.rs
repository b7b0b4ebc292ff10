//! Small stages shared by the engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sx_engine::{Component, Real};

/// Output = gain * input + offset.
pub struct Affine {
    pub gain: Real,
    pub offset: Real,
}

impl Affine {
    pub fn new(gain: Real, offset: Real) -> Self {
        Self { gain, offset }
    }
}

impl Component for Affine {
    fn kind(&self) -> &'static str {
        "Affine"
    }

    fn tick(&mut self, _time: Real, input: Real) -> Option<Real> {
        Some(self.gain * input + self.offset)
    }
}

/// Re-emits the sample seen on the previous tick (one-tick transport delay).
pub struct UnitDelay {
    held: Real,
    pending: Real,
    last_time: Option<Real>,
}

impl UnitDelay {
    pub fn new() -> Self {
        Self {
            held: 0.0,
            pending: 0.0,
            last_time: None,
        }
    }
}

impl Component for UnitDelay {
    fn kind(&self) -> &'static str {
        "UnitDelay"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        if self.last_time != Some(time) {
            self.held = self.pending;
            self.last_time = Some(time);
        }
        self.pending = input;
        Some(self.held)
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Running sum of every input it has seen, once per distinct time.
pub struct Accumulator {
    pub total: Real,
    last_time: Option<Real>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            total: 0.0,
            last_time: None,
        }
    }
}

impl Component for Accumulator {
    fn kind(&self) -> &'static str {
        "Accumulator"
    }

    fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        if self.last_time != Some(time) {
            self.total += input;
            self.last_time = Some(time);
        }
        Some(self.total)
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Pass-through that counts how often it was evaluated.
pub struct Probe {
    calls: Arc<AtomicUsize>,
}

impl Probe {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    pub fn count(calls: &Arc<AtomicUsize>) -> usize {
        calls.load(Ordering::SeqCst)
    }
}

impl Component for Probe {
    fn kind(&self) -> &'static str {
        "Probe"
    }

    fn tick(&mut self, _time: Real, input: Real) -> Option<Real> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(input)
    }
}

/// Never publishes anything.
pub struct Sink;

impl Component for Sink {
    fn kind(&self) -> &'static str {
        "Sink"
    }

    fn tick(&mut self, _time: Real, _input: Real) -> Option<Real> {
        None
    }
}

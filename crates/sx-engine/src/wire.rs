//! Scalar signal carrier.

use sx_core::{CompId, Real, WireId};

/// A named scalar signal with its recorded history.
///
/// The effects list holds handles of the components that read this wire.
/// It is filled when a component is added to the owning netlist and is the
/// only dependency information the settle loop uses.
#[derive(Debug, Clone)]
pub struct Wire {
    id: WireId,
    name: String,
    value: Real,
    history: Vec<Real>,
    time_axis: Vec<Real>,
    dirty: bool,
    effects: Vec<CompId>,
}

impl Wire {
    /// Create an idle wire (value 0, empty history).
    pub fn new(id: WireId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            value: 0.0,
            history: Vec::new(),
            time_axis: Vec::new(),
            dirty: false,
            effects: Vec::new(),
        }
    }

    pub fn id(&self) -> WireId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value ("now"; not time-indexed).
    pub fn read(&self) -> Real {
        self.value
    }

    /// Set the value and record `(time, value)` without marking the wire dirty.
    pub fn write_async(&mut self, value: Real, time: Real) {
        self.value = value;
        self.history.push(value);
        self.time_axis.push(time);
    }

    /// Set the value, record it, and mark the wire as changed this tick.
    pub fn write(&mut self, value: Real, time: Real) {
        self.write_async(value, time);
        self.dirty = true;
    }

    /// Recorded values, one per committed write since the last reset.
    pub fn history(&self) -> &[Real] {
        &self.history
    }

    /// Timestamps matching `history` element for element.
    pub fn time_axis(&self) -> &[Real] {
        &self.time_axis
    }

    /// Iterate `(time, value)` samples in write order.
    pub fn samples(&self) -> impl Iterator<Item = (Real, Real)> + '_ {
        self.time_axis
            .iter()
            .copied()
            .zip(self.history.iter().copied())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Components that read this wire.
    pub fn effects(&self) -> &[CompId] {
        &self.effects
    }

    /// Clear the value, history and dirty flag. Effects are topology and stay.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.history.clear();
        self.time_axis.clear();
        self.dirty = false;
    }

    /// Clear the dirty flag, returning whether it was set.
    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drop every sample stamped `time` and restore the value held before them.
    pub(crate) fn discard_at(&mut self, time: Real) {
        while self.time_axis.last() == Some(&time) {
            self.time_axis.pop();
            self.history.pop();
        }
        self.value = self.history.last().copied().unwrap_or(0.0);
        self.dirty = false;
    }

    pub(crate) fn add_effect(&mut self, comp: CompId) {
        self.effects.push(comp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sx_core::Id;

    fn wire() -> Wire {
        Wire::new(Id::from_index(0), "W")
    }

    #[test]
    fn write_async_records_without_dirty() {
        let mut w = wire();
        w.write_async(1.5, 0.0);
        assert_eq!(w.read(), 1.5);
        assert_eq!(w.history(), &[1.5]);
        assert_eq!(w.time_axis(), &[0.0]);
        assert!(!w.is_dirty());
    }

    #[test]
    fn write_marks_dirty() {
        let mut w = wire();
        w.write(-2.0, 0.1);
        assert!(w.is_dirty());
        assert!(w.take_dirty());
        assert!(!w.is_dirty());
        assert!(!w.take_dirty());
    }

    #[test]
    fn reset_keeps_effects() {
        let mut w = wire();
        w.add_effect(Id::from_index(4));
        w.write(3.0, 0.0);
        w.write(4.0, 0.1);
        w.reset();

        assert_eq!(w.read(), 0.0);
        assert!(w.history().is_empty());
        assert!(w.time_axis().is_empty());
        assert!(!w.is_dirty());
        assert_eq!(w.effects(), &[Id::from_index(4)]);
    }

    #[test]
    fn non_finite_values_pass_through() {
        let mut w = wire();
        w.write(f64::NAN, 0.0);
        w.write(f64::INFINITY, 0.1);
        assert!(w.history()[0].is_nan());
        assert_eq!(w.read(), f64::INFINITY);
    }

    #[test]
    fn samples_pair_time_and_value() {
        let mut w = wire();
        w.write_async(1.0, 0.0);
        w.write(2.0, 0.5);
        let samples: Vec<_> = w.samples().collect();
        assert_eq!(samples, vec![(0.0, 1.0), (0.5, 2.0)]);
    }

    #[test]
    fn discard_at_drops_only_that_time() {
        let mut w = wire();
        w.write(1.0, 0.0);
        w.write(2.0, 0.1);
        w.write(3.0, 0.1);
        w.discard_at(0.1);

        assert_eq!(w.history(), &[1.0]);
        assert_eq!(w.time_axis(), &[0.0]);
        assert_eq!(w.read(), 1.0);
        assert!(!w.is_dirty());

        w.discard_at(0.0);
        assert!(w.history().is_empty());
        assert_eq!(w.read(), 0.0);
    }
}

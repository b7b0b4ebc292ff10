//! The stage contract shared by every line coder, modulator and demodulator.

use std::fmt;

use sx_core::{CompId, Real, WireId};

/// A stateful stage that turns one input wire into one output wire.
///
/// The engine reads the input wire, calls [`Component::tick`], and publishes
/// a returned value on the output wire with a dirty-marking write.
///
/// `tick` may run more than once within a single logical tick with the same
/// `time` and input. Stages must key their state transitions off `time` (or
/// sample indices derived from it) so repeated calls do not compound.
pub trait Component: Send {
    /// Short type label used in diagnostics and topology listings.
    fn kind(&self) -> &'static str;

    /// Evaluate the stage at `time` for the current `input` value.
    ///
    /// `None` leaves the output wire untouched for this call.
    fn tick(&mut self, time: Real, input: Real) -> Option<Real>;

    /// Restore the state the stage had right after construction.
    fn reset(&mut self) {}
}

/// A component bound into a netlist between its input and output wires.
///
/// The wire pair is fixed for the lifetime of the slot.
pub struct ComponentSlot {
    id: CompId,
    input: WireId,
    output: WireId,
    component: Box<dyn Component>,
}

impl ComponentSlot {
    pub(crate) fn new(
        id: CompId,
        input: WireId,
        output: WireId,
        component: Box<dyn Component>,
    ) -> Self {
        Self {
            id,
            input,
            output,
            component,
        }
    }

    pub fn id(&self) -> CompId {
        self.id
    }

    pub fn input_wire(&self) -> WireId {
        self.input
    }

    pub fn output_wire(&self) -> WireId {
        self.output
    }

    pub fn kind(&self) -> &'static str {
        self.component.kind()
    }

    pub(crate) fn tick(&mut self, time: Real, input: Real) -> Option<Real> {
        self.component.tick(time, input)
    }

    pub(crate) fn reset(&mut self) {
        self.component.reset();
    }
}

impl fmt::Debug for ComponentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSlot")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

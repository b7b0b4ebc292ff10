//! Arena of wires and components.

use sx_core::{CompId, Real, WireId};

use crate::component::{Component, ComponentSlot};
use crate::error::{SimError, SimResult};
use crate::wire::Wire;

/// Owner of every wire and component of a scenario.
///
/// Use `add_wire` and `add_component` to assemble the circuit, then hand the
/// netlist to a [`crate::Simulation`]. Handles stay valid for the lifetime of
/// the netlist; nothing is ever removed.
#[derive(Debug, Default)]
pub struct Netlist {
    pub(crate) wires: Vec<Wire>,
    pub(crate) components: Vec<ComponentSlot>,
}

impl Netlist {
    /// Create a new empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a wire and return its handle.
    ///
    /// Names are for diagnostics and plotting; they are not required to be
    /// unique, but name lookups return the first match.
    pub fn add_wire(&mut self, name: impl Into<String>) -> WireId {
        let id = WireId::from_index(self.wires.len() as u32);
        self.wires.push(Wire::new(id, name));
        id
    }

    /// Bind `component` between `input` and `output` and return its handle.
    ///
    /// The new component is appended to the input wire's effects list right
    /// away, independent of whether a simulation later registers it. An
    /// unregistered component still ticks whenever its input settles, but
    /// its output wire is not scanned, so nothing downstream of it runs.
    pub fn add_component(
        &mut self,
        input: WireId,
        output: WireId,
        component: impl Component + 'static,
    ) -> SimResult<CompId> {
        self.add_boxed(input, output, Box::new(component))
    }

    /// Same as [`Netlist::add_component`] for an already boxed stage.
    pub fn add_boxed(
        &mut self,
        input: WireId,
        output: WireId,
        component: Box<dyn Component>,
    ) -> SimResult<CompId> {
        self.check_wire(input)?;
        self.check_wire(output)?;

        let id = CompId::from_index(self.components.len() as u32);
        self.components
            .push(ComponentSlot::new(id, input, output, component));
        self.wires[input.slot()].add_effect(id);
        Ok(id)
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(id.slot())
    }

    pub fn component(&self, id: CompId) -> Option<&ComponentSlot> {
        self.components.get(id.slot())
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn components(&self) -> &[ComponentSlot] {
        &self.components
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// First wire carrying `name`.
    pub fn find_wire(&self, name: &str) -> Option<WireId> {
        self.wires.iter().find(|w| w.name() == name).map(Wire::id)
    }

    pub(crate) fn check_wire(&self, id: WireId) -> SimResult<()> {
        if id.slot() < self.wires.len() {
            Ok(())
        } else {
            Err(SimError::UnknownWire { id })
        }
    }

    pub(crate) fn check_component(&self, id: CompId) -> SimResult<()> {
        if id.slot() < self.components.len() {
            Ok(())
        } else {
            Err(SimError::UnknownComponent { id })
        }
    }

    /// Run one component and publish its result on its output wire.
    pub(crate) fn tick_component(&mut self, id: CompId, time: Real) {
        let slot = &mut self.components[id.slot()];
        let input = self.wires[slot.input_wire().slot()].read();
        if let Some(value) = slot.tick(time, input) {
            self.wires[slot.output_wire().slot()].write(value, time);
        }
    }
}

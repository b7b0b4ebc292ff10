//! Small builder that wires stages into a netlist and hands back a
//! registered [`Simulation`].

use sx_core::Real;
use sx_engine::{CompId, Component, Netlist, Simulation, WireId};

use crate::error::ScenarioResult;

pub(crate) struct Layout {
    net: Netlist,
    input: WireId,
    stages: Vec<CompId>,
}

impl Layout {
    pub(crate) fn new(input_name: &str) -> Self {
        let mut net = Netlist::new();
        let input = net.add_wire(input_name);
        Self {
            net,
            input,
            stages: Vec::new(),
        }
    }

    pub(crate) fn input(&self) -> WireId {
        self.input
    }

    /// Add `stage` reading `from` and writing a new wire called `output`.
    pub(crate) fn stage(
        &mut self,
        from: WireId,
        output: &str,
        stage: Box<dyn Component>,
    ) -> ScenarioResult<WireId> {
        let wire = self.net.add_wire(output);
        let id = self.net.add_boxed(from, wire, stage)?;
        self.stages.push(id);
        Ok(wire)
    }

    pub(crate) fn finish(
        self,
        input_fn: impl Fn(Real) -> Real + Send + 'static,
        dt: Real,
    ) -> ScenarioResult<Simulation> {
        let mut sim = Simulation::new(self.net, self.input, input_fn, dt)?;
        for id in self.stages {
            sim.add_component(id)?;
        }
        Ok(sim)
    }
}

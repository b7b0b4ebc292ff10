//! Read-only topology snapshot for diagnostics.

use std::collections::BTreeSet;

use sx_core::{CompId, WireId};

use crate::simulation::Simulation;

/// A registered wire as seen by introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireInfo {
    pub id: WireId,
    pub name: String,
    /// Components reading this wire.
    pub effects: Vec<CompId>,
    /// Samples recorded since the last reset.
    pub samples: usize,
}

/// A registered component as seen by introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    pub id: CompId,
    pub kind: &'static str,
    pub input: WireId,
    pub output: WireId,
}

/// Snapshot of the wires and components registered on a simulation.
///
/// Capturing never mutates the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub input_wire: WireId,
    pub wires: Vec<WireInfo>,
    pub components: Vec<ComponentInfo>,
}

impl Topology {
    pub(crate) fn capture(sim: &Simulation) -> Self {
        let wires = sim
            .wires()
            .map(|w| WireInfo {
                id: w.id(),
                name: w.name().to_string(),
                effects: w.effects().to_vec(),
                samples: w.history().len(),
            })
            .collect();

        let components = sim
            .components()
            .map(|c| ComponentInfo {
                id: c.id(),
                kind: c.kind(),
                input: c.input_wire(),
                output: c.output_wire(),
            })
            .collect();

        Self {
            input_wire: sim.input_wire(),
            wires,
            components,
        }
    }

    pub fn wire(&self, id: WireId) -> Option<&WireInfo> {
        self.wires.iter().find(|w| w.id == id)
    }

    pub fn component(&self, id: CompId) -> Option<&ComponentInfo> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Registered components whose output is `wire`.
    pub fn writers(&self, wire: WireId) -> Vec<CompId> {
        self.components
            .iter()
            .filter(|c| c.output == wire)
            .map(|c| c.id)
            .collect()
    }

    /// Registered components whose input is `wire`.
    pub fn readers(&self, wire: WireId) -> Vec<CompId> {
        self.components
            .iter()
            .filter(|c| c.input == wire)
            .map(|c| c.id)
            .collect()
    }

    /// Settle passes one tick needs when every component writes its output.
    ///
    /// Walks the same levels the settle loop does, starting from the input
    /// wire's readers. Returns `None` when the walk outgrows the component
    /// count, which only a cyclic topology can do.
    pub fn settle_depth(&self) -> Option<usize> {
        let effects_of = |wire: WireId| {
            self.wire(wire)
                .map(|w| w.effects.clone())
                .unwrap_or_default()
        };

        let mut level: BTreeSet<CompId> = effects_of(self.input_wire).into_iter().collect();
        let mut depth = 0;
        while !level.is_empty() {
            if depth > self.components.len() {
                return None;
            }
            depth += 1;
            level = level
                .iter()
                .filter_map(|id| self.component(*id))
                .flat_map(|c| effects_of(c.output))
                .collect();
        }
        Some(depth)
    }
}

//! Logical clock and per-tick settle loop.

use std::collections::BTreeSet;
use std::fmt;

use sx_core::{CompId, Real, WireId, ensure_positive};
use tracing::{debug, trace, warn};

use crate::component::ComponentSlot;
use crate::error::{SimError, SimResult};
use crate::netlist::Netlist;
use crate::topology::Topology;
use crate::wire::Wire;

/// External input source: logical time to value on the input wire.
pub type InputFn = Box<dyn Fn(Real) -> Real + Send>;

/// Options for a simulation.
#[derive(Clone, Debug, Default)]
pub struct SimOptions {
    /// Upper bound on settle passes within one tick.
    ///
    /// `None` uses the netlist's component count plus one, which no acyclic
    /// topology can reach.
    pub max_passes: Option<usize>,
}

/// What one call to [`Simulation::advance`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Settle passes executed (levels of the worklist).
    pub passes: usize,
    /// Component evaluations across all passes.
    pub ticks: usize,
}

/// Owns a netlist, the registered subset of it, and the logical clock.
pub struct Simulation {
    netlist: Netlist,
    wires: Vec<WireId>,
    components: Vec<CompId>,
    input_wire: WireId,
    input_fn: InputFn,
    dt: Real,
    current_time: Real,
    options: SimOptions,
}

impl Simulation {
    /// Create a simulation driven through `input_wire` by `input_fn`.
    ///
    /// The input wire is registered immediately so that `reset` always
    /// clears it, even before any component is added.
    pub fn new(
        netlist: Netlist,
        input_wire: WireId,
        input_fn: impl Fn(Real) -> Real + Send + 'static,
        dt: Real,
    ) -> SimResult<Self> {
        let dt = ensure_positive(dt, "dt")?;
        netlist.check_wire(input_wire)?;

        Ok(Self {
            netlist,
            wires: vec![input_wire],
            components: Vec::new(),
            input_wire,
            input_fn: Box::new(input_fn),
            dt,
            current_time: 0.0,
            options: SimOptions::default(),
        })
    }

    pub fn with_options(mut self, options: SimOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a component together with both of its wires.
    ///
    /// Re-adding an already registered component is a no-op.
    pub fn add_component(&mut self, id: CompId) -> SimResult<()> {
        self.netlist.check_component(id)?;
        if self.components.contains(&id) {
            return Ok(());
        }
        self.components.push(id);

        let slot = &self.netlist.components[id.slot()];
        let (input, output, kind) = (slot.input_wire(), slot.output_wire(), slot.kind());
        self.add_wire(input)?;
        self.add_wire(output)?;

        debug!(component = %id, kind, "registered component");
        Ok(())
    }

    /// Register a wire for dirty scanning and reset. Idempotent.
    pub fn add_wire(&mut self, id: WireId) -> SimResult<()> {
        self.netlist.check_wire(id)?;
        if !self.wires.contains(&id) {
            self.wires.push(id);
        }
        Ok(())
    }

    /// Execute one tick: seed the input, settle, then advance the clock.
    ///
    /// Each pass ticks every component of the current worklist once; the
    /// next worklist is the union of the effects of every registered wire
    /// found dirty after the pass. Worklists are sets, so a component
    /// reached through several dirty wires still ticks once per pass.
    ///
    /// A tick that exceeds the pass limit fails with
    /// [`SimError::NoConvergence`] and is rolled back: every sample written
    /// at the current time is discarded and the clock stays put, so wire
    /// histories read as if the call never happened. Component state is not
    /// rolled back.
    pub fn advance(&mut self) -> SimResult<TickReport> {
        let time = self.current_time;
        let seed = (self.input_fn)(time);

        let input = &mut self.netlist.wires[self.input_wire.slot()];
        input.write_async(seed, time);
        let mut worklist: BTreeSet<CompId> = input.effects().iter().copied().collect();

        let limit = self.pass_limit();
        let mut report = TickReport::default();

        while !worklist.is_empty() {
            if report.passes >= limit {
                self.discard_tick(time);
                warn!(
                    time,
                    passes = report.passes,
                    pending = worklist.len(),
                    "tick did not settle"
                );
                return Err(SimError::NoConvergence {
                    time,
                    passes: report.passes,
                });
            }
            report.passes += 1;

            for &comp in &worklist {
                self.netlist.tick_component(comp, time);
                report.ticks += 1;
            }

            let mut next = BTreeSet::new();
            for &id in &self.wires {
                let wire = &mut self.netlist.wires[id.slot()];
                if wire.take_dirty() {
                    next.extend(wire.effects().iter().copied());
                }
            }
            worklist = next;
        }
        // Wires written by components reached only through effects lists.
        self.clear_dirty();

        self.current_time += self.dt;
        trace!(
            time,
            passes = report.passes,
            ticks = report.ticks,
            "tick settled"
        );
        Ok(report)
    }

    /// Clock to zero, then every wire, then every component.
    ///
    /// Covers the whole netlist, not only the registered subset, since an
    /// unregistered reader of a registered wire still ticks during a run.
    pub fn reset(&mut self) {
        self.current_time = 0.0;
        for wire in &mut self.netlist.wires {
            wire.reset();
        }
        for comp in &mut self.netlist.components {
            comp.reset();
        }
        debug!(
            wires = self.netlist.wire_count(),
            components = self.netlist.component_count(),
            "simulation reset"
        );
    }

    /// Settle passes a single tick may use before failing.
    pub fn pass_limit(&self) -> usize {
        self.options
            .max_passes
            .unwrap_or(self.netlist.component_count() + 1)
    }

    pub fn current_time(&self) -> Real {
        self.current_time
    }

    pub fn dt(&self) -> Real {
        self.dt
    }

    pub fn input_wire(&self) -> WireId {
        self.input_wire
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.netlist.wire(id)
    }

    /// First registered wire carrying `name`.
    pub fn wire_by_name(&self, name: &str) -> Option<&Wire> {
        self.wires().find(|w| w.name() == name)
    }

    /// Registered wires, in registration order.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> + '_ {
        self.wires.iter().map(|id| &self.netlist.wires[id.slot()])
    }

    /// Registered components, in registration order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentSlot> + '_ {
        self.components
            .iter()
            .map(|id| &self.netlist.components[id.slot()])
    }

    pub fn wire_ids(&self) -> &[WireId] {
        &self.wires
    }

    pub fn component_ids(&self) -> &[CompId] {
        &self.components
    }

    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    /// Read-only snapshot of the registered topology.
    pub fn topology(&self) -> Topology {
        Topology::capture(self)
    }

    fn clear_dirty(&mut self) {
        for wire in &mut self.netlist.wires {
            wire.take_dirty();
        }
    }

    fn discard_tick(&mut self, time: Real) {
        for wire in &mut self.netlist.wires {
            wire.discard_at(time);
        }
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("current_time", &self.current_time)
            .field("dt", &self.dt)
            .field("input_wire", &self.input_wire)
            .field("wires", &self.wires)
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use sx_core::Id;

    struct Gain(Real);

    impl Component for Gain {
        fn kind(&self) -> &'static str {
            "Gain"
        }

        fn tick(&mut self, _time: Real, input: Real) -> Option<Real> {
            Some(self.0 * input)
        }
    }

    fn chain() -> (Simulation, WireId, WireId, CompId) {
        let mut net = Netlist::new();
        let w_in = net.add_wire("In");
        let w_out = net.add_wire("Out");
        let comp = net.add_component(w_in, w_out, Gain(3.0)).unwrap();
        let sim = Simulation::new(net, w_in, |_t| 1.0, 0.1).unwrap();
        (sim, w_in, w_out, comp)
    }

    #[test]
    fn new_rejects_bad_dt() {
        let mut net = Netlist::new();
        let w = net.add_wire("In");
        assert!(Simulation::new(net, w, |_t| 0.0, 0.0).is_err());

        let mut net = Netlist::new();
        let w = net.add_wire("In");
        assert!(Simulation::new(net, w, |_t| 0.0, f64::NAN).is_err());
    }

    #[test]
    fn new_rejects_unknown_input_wire() {
        let net = Netlist::new();
        let err = Simulation::new(net, Id::from_index(0), |_t| 0.0, 0.1).unwrap_err();
        assert_eq!(
            err,
            SimError::UnknownWire {
                id: Id::from_index(0)
            }
        );
    }

    #[test]
    fn add_component_is_idempotent() {
        let (mut sim, w_in, w_out, comp) = chain();
        sim.add_component(comp).unwrap();
        sim.add_component(comp).unwrap();
        sim.add_wire(w_out).unwrap();

        assert_eq!(sim.component_ids(), &[comp]);
        assert_eq!(sim.wire_ids(), &[w_in, w_out]);
    }

    #[test]
    fn add_component_rejects_foreign_handle() {
        let (mut sim, _, _, _) = chain();
        let stray = Id::from_index(5);
        assert_eq!(
            sim.add_component(stray).unwrap_err(),
            SimError::UnknownComponent { id: stray }
        );
    }

    #[test]
    fn advance_settles_and_moves_clock() {
        let (mut sim, w_in, w_out, comp) = chain();
        sim.add_component(comp).unwrap();
        sim.reset();

        let report = sim.advance().unwrap();

        assert_eq!(report, TickReport { passes: 1, ticks: 1 });
        assert!((sim.current_time() - 0.1).abs() < 1e-12);
        assert_eq!(sim.wire(w_in).unwrap().history(), &[1.0]);
        assert_eq!(sim.wire(w_out).unwrap().history(), &[3.0]);
        assert_eq!(sim.wire(w_out).unwrap().time_axis(), &[0.0]);
    }

    #[test]
    fn input_without_readers_still_records() {
        let mut net = Netlist::new();
        let w_in = net.add_wire("In");
        let mut sim = Simulation::new(net, w_in, |t| 10.0 * t, 0.5).unwrap();

        sim.advance().unwrap();
        sim.advance().unwrap();

        assert_eq!(sim.wire(w_in).unwrap().history(), &[0.0, 5.0]);
        sim.reset();
        assert!(sim.wire(w_in).unwrap().history().is_empty());
    }

    #[test]
    fn wire_lookup_by_name_only_sees_registered_wires() {
        let (mut sim, _, _, comp) = chain();
        assert!(sim.wire_by_name("Out").is_none());
        sim.add_component(comp).unwrap();
        assert_eq!(sim.wire_by_name("Out").unwrap().name(), "Out");
    }

    #[test]
    fn default_pass_limit_tracks_component_count() {
        let (sim, _, _, _) = chain();
        assert_eq!(sim.pass_limit(), 2);
        let sim = sim.with_options(SimOptions {
            max_passes: Some(16),
        });
        assert_eq!(sim.pass_limit(), 16);
    }
}

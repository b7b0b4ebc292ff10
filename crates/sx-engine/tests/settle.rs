//! Settle-loop behaviour of the simulation engine.

mod support;

use support::{Accumulator, Affine, Probe, Sink, UnitDelay};
use sx_engine::{Netlist, SimError, SimOptions, Simulation, TickReport, WireId};

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-12, "{a} != {b}");
}

#[test]
fn single_stage_end_to_end() {
    // Constant 1.0 -> [x * 2 + 0.5] -> unread output
    let mut net = Netlist::new();
    let w_in = net.add_wire("Input");
    let w_out = net.add_wire("Output");
    let stage = net.add_component(w_in, w_out, Affine::new(2.0, 0.5)).unwrap();

    let mut sim = Simulation::new(net, w_in, |_t| 1.0, 0.1).unwrap();
    sim.add_component(stage).unwrap();
    sim.reset();
    sim.advance().unwrap();

    assert_close(sim.current_time(), 0.1);
    assert_eq!(sim.wire(w_in).unwrap().history(), &[1.0]);
    assert_eq!(sim.wire(w_out).unwrap().history(), &[2.5]);
    assert_eq!(sim.wire(w_out).unwrap().time_axis(), &[0.0]);
}

#[test]
fn two_stage_chain_settles_in_one_tick() {
    // W1 -> [f] -> W2 -> [g] -> W3
    let mut net = Netlist::new();
    let w1 = net.add_wire("W1");
    let w2 = net.add_wire("W2");
    let w3 = net.add_wire("W3");
    let a = net.add_component(w1, w2, Affine::new(3.0, 0.0)).unwrap();
    let b = net.add_component(w2, w3, Affine::new(1.0, -4.0)).unwrap();

    let input = |t: f64| 2.0 + t;
    let mut sim = Simulation::new(net, w1, input, 0.25).unwrap();
    sim.add_component(a).unwrap();
    sim.add_component(b).unwrap();
    sim.reset();

    let report = sim.advance().unwrap();

    let f = |x: f64| 3.0 * x;
    let g = |x: f64| x - 4.0;
    assert_eq!(report.passes, 2);
    assert_eq!(sim.wire(w3).unwrap().history()[0], g(f(input(0.0))));
}

#[test]
fn linear_chain_pass_count_matches_length() {
    let mut net = Netlist::new();
    let wires: Vec<WireId> = (0..4).map(|i| net.add_wire(format!("W{i}"))).collect();
    let comps: Vec<_> = wires
        .windows(2)
        .map(|pair| net.add_component(pair[0], pair[1], Affine::new(1.0, 1.0)).unwrap())
        .collect();

    let mut sim = Simulation::new(net, wires[0], |_t| 0.0, 0.01).unwrap();
    for comp in comps {
        sim.add_component(comp).unwrap();
    }
    sim.reset();

    for _ in 0..5 {
        let report = sim.advance().unwrap();
        assert_eq!(report, TickReport { passes: 3, ticks: 3 });
    }
    assert_eq!(sim.topology().settle_depth(), Some(3));
    assert_eq!(sim.wire(wires[3]).unwrap().history(), &[3.0; 5]);
}

#[test]
fn dirty_flags_clear_after_every_tick() {
    let mut net = Netlist::new();
    let w1 = net.add_wire("W1");
    let w2 = net.add_wire("W2");
    let w3 = net.add_wire("W3");
    let a = net.add_component(w1, w2, Affine::new(1.0, 0.0)).unwrap();
    let b = net.add_component(w1, w3, Accumulator::new()).unwrap();

    let mut sim = Simulation::new(net, w1, |t| t, 0.1).unwrap();
    sim.add_component(a).unwrap();
    sim.add_component(b).unwrap();
    sim.reset();

    for _ in 0..10 {
        sim.advance().unwrap();
        assert!(sim.wires().all(|w| !w.is_dirty()));
    }
}

#[test]
fn history_grows_once_per_tick() {
    let mut net = Netlist::new();
    let w1 = net.add_wire("W1");
    let w2 = net.add_wire("W2");
    let w3 = net.add_wire("W3");
    let a = net.add_component(w1, w2, Affine::new(-1.0, 0.0)).unwrap();
    let b = net.add_component(w2, w3, Accumulator::new()).unwrap();

    let mut sim = Simulation::new(net, w1, |t| t * t, 0.05).unwrap();
    sim.add_component(a).unwrap();
    sim.add_component(b).unwrap();
    sim.reset();

    let n = 37;
    for _ in 0..n {
        sim.advance().unwrap();
    }
    for wire in sim.wires() {
        assert_eq!(wire.history().len(), n, "wire {}", wire.name());
        assert_eq!(wire.time_axis().len(), n, "wire {}", wire.name());
    }
}

#[test]
fn component_reached_twice_in_a_pass_ticks_once() {
    // Two writers publish on the same wire in the same pass; its single
    // reader must be evaluated once in the following pass.
    let mut net = Netlist::new();
    let w_in = net.add_wire("In");
    let w_mid = net.add_wire("Mid");
    let w_out = net.add_wire("Out");
    let a = net.add_component(w_in, w_mid, Affine::new(1.0, 0.0)).unwrap();
    let b = net.add_component(w_in, w_mid, Affine::new(2.0, 0.0)).unwrap();
    let (probe, calls) = Probe::new();
    let c = net.add_component(w_mid, w_out, probe).unwrap();

    let mut sim = Simulation::new(net, w_in, |_t| 1.0, 0.1).unwrap();
    for comp in [a, b, c] {
        sim.add_component(comp).unwrap();
    }
    sim.reset();

    let report = sim.advance().unwrap();

    assert_eq!(report, TickReport { passes: 2, ticks: 3 });
    assert_eq!(Probe::count(&calls), 1);
    // Both writers committed; the later handle wins the final value.
    assert_eq!(sim.wire(w_mid).unwrap().history().len(), 2);
    assert_eq!(sim.wire(w_out).unwrap().history(), &[2.0]);
}

#[test]
fn stage_state_models_transport_delay() {
    let mut net = Netlist::new();
    let w_in = net.add_wire("In");
    let w_out = net.add_wire("Delayed");
    let d = net.add_component(w_in, w_out, UnitDelay::new()).unwrap();

    let mut sim = Simulation::new(net, w_in, |t| (t * 10.0).round(), 0.1).unwrap();
    sim.add_component(d).unwrap();
    sim.reset();
    for _ in 0..4 {
        sim.advance().unwrap();
    }

    assert_eq!(sim.wire(w_in).unwrap().history(), &[0.0, 1.0, 2.0, 3.0]);
    assert_eq!(sim.wire(w_out).unwrap().history(), &[0.0, 0.0, 1.0, 2.0]);
}

#[test]
fn silent_stage_stops_propagation() {
    let mut net = Netlist::new();
    let w_in = net.add_wire("In");
    let w_mid = net.add_wire("Mid");
    let w_out = net.add_wire("Out");
    let sink = net.add_component(w_in, w_mid, Sink).unwrap();
    let (probe, calls) = Probe::new();
    let after = net.add_component(w_mid, w_out, probe).unwrap();

    let mut sim = Simulation::new(net, w_in, |_t| 5.0, 0.1).unwrap();
    sim.add_component(sink).unwrap();
    sim.add_component(after).unwrap();
    sim.reset();
    let report = sim.advance().unwrap();

    assert_eq!(report.passes, 1);
    assert_eq!(Probe::count(&calls), 0);
    assert!(sim.wire(w_mid).unwrap().history().is_empty());
}

#[test]
fn reset_is_idempotent() {
    let mut net = Netlist::new();
    let w_in = net.add_wire("In");
    let w_out = net.add_wire("Sum");
    let acc = net.add_component(w_in, w_out, Accumulator::new()).unwrap();

    let mut sim = Simulation::new(net, w_in, |_t| 1.0, 0.1).unwrap();
    sim.add_component(acc).unwrap();
    sim.reset();
    for _ in 0..5 {
        sim.advance().unwrap();
    }
    assert_eq!(sim.wire(w_out).unwrap().read(), 5.0);

    sim.reset();
    sim.reset();
    assert_eq!(sim.current_time(), 0.0);
    for wire in sim.wires() {
        assert_eq!(wire.read(), 0.0);
        assert!(wire.history().is_empty());
    }

    // Accumulator state went back to zero as well.
    sim.advance().unwrap();
    assert_eq!(sim.wire(w_out).unwrap().history(), &[1.0]);
}

#[test]
fn reset_keeps_topology() {
    let mut net = Netlist::new();
    let w_in = net.add_wire("In");
    let w_out = net.add_wire("Out");
    let comp = net.add_component(w_in, w_out, Affine::new(1.0, 0.0)).unwrap();
    let mut sim = Simulation::new(net, w_in, |_t| 1.0, 0.1).unwrap();
    sim.add_component(comp).unwrap();

    let before = sim.topology();
    sim.reset();
    let after = sim.topology();
    assert_eq!(before.components, after.components);
    assert_eq!(sim.wire(w_in).unwrap().effects(), &[comp]);
}

#[test]
fn non_finite_values_propagate() {
    let mut net = Netlist::new();
    let w_in = net.add_wire("In");
    let w_out = net.add_wire("Out");
    let comp = net.add_component(w_in, w_out, Affine::new(2.0, 0.0)).unwrap();
    let mut sim = Simulation::new(net, w_in, |_t| f64::NAN, 0.1).unwrap();
    sim.add_component(comp).unwrap();
    sim.reset();

    sim.advance().unwrap();
    assert!(sim.wire(w_out).unwrap().read().is_nan());
}

#[test]
fn cyclic_topology_fails_with_diagnosable_error() {
    // W1 -> [A] -> W2 -> [B] -> W1
    let mut net = Netlist::new();
    let w1 = net.add_wire("W1");
    let w2 = net.add_wire("W2");
    let a = net.add_component(w1, w2, Affine::new(1.0, 1.0)).unwrap();
    let b = net.add_component(w2, w1, Affine::new(1.0, 1.0)).unwrap();

    let mut sim = Simulation::new(net, w1, |_t| 0.0, 0.1).unwrap();
    sim.add_component(a).unwrap();
    sim.add_component(b).unwrap();
    sim.reset();

    let err = sim.advance().unwrap_err();
    assert_eq!(
        err,
        SimError::NoConvergence {
            time: 0.0,
            passes: 3
        }
    );
    assert_eq!(sim.current_time(), 0.0);
    assert!(sim.wires().all(|w| !w.is_dirty()));
    assert_eq!(sim.topology().settle_depth(), None);

    // The failed tick leaves no samples behind.
    for wire in sim.wires() {
        assert!(wire.history().is_empty(), "{} kept samples", wire.name());
        assert_eq!(wire.read(), 0.0);
    }
}

#[test]
fn failed_tick_keeps_earlier_samples() {
    // W0 -> W1 -> W2 -> W3 with room for only two passes per tick.
    let mut net = Netlist::new();
    let wires: Vec<WireId> = (0..4).map(|i| net.add_wire(format!("W{i}"))).collect();
    let comps: Vec<_> = wires
        .windows(2)
        .map(|pair| net.add_component(pair[0], pair[1], Affine::new(2.0, 0.0)).unwrap())
        .collect();

    let mut sim = Simulation::new(net, wires[0], |t| 10.0 * t + 1.0, 0.1)
        .unwrap()
        .with_options(SimOptions {
            max_passes: Some(2),
        });
    // W2 is not scanned until its writer is registered, so early ticks
    // settle in two passes.
    sim.add_component(comps[0]).unwrap();
    sim.reset();
    sim.advance().unwrap();
    sim.advance().unwrap();

    for &comp in &comps[1..] {
        sim.add_component(comp).unwrap();
    }
    let before: Vec<Vec<f64>> = wires
        .iter()
        .map(|&w| sim.wire(w).unwrap().history().to_vec())
        .collect();

    assert!(matches!(
        sim.advance(),
        Err(SimError::NoConvergence { passes: 2, .. })
    ));

    assert_close(sim.current_time(), 0.2);
    for (&w, expected) in wires.iter().zip(&before) {
        let wire = sim.wire(w).unwrap();
        assert_eq!(wire.history(), expected.as_slice());
        assert_eq!(wire.time_axis().len(), expected.len());
        assert_eq!(wire.read(), expected.last().copied().unwrap_or(0.0));
        assert!(!wire.is_dirty());
    }
}

#[test]
fn explicit_pass_limit_applies() {
    let mut net = Netlist::new();
    let wires: Vec<WireId> = (0..4).map(|i| net.add_wire(format!("W{i}"))).collect();
    let comps: Vec<_> = wires
        .windows(2)
        .map(|pair| net.add_component(pair[0], pair[1], Affine::new(1.0, 0.0)).unwrap())
        .collect();

    let mut sim = Simulation::new(net, wires[0], |_t| 1.0, 0.1)
        .unwrap()
        .with_options(SimOptions {
            max_passes: Some(2),
        });
    for comp in comps {
        sim.add_component(comp).unwrap();
    }
    sim.reset();

    assert!(matches!(
        sim.advance(),
        Err(SimError::NoConvergence { passes: 2, .. })
    ));
}

#[test]
fn unregistered_reader_is_still_ticked_through_effects() {
    let mut net = Netlist::new();
    let w_in = net.add_wire("In");
    let w_out = net.add_wire("Out");
    let (probe, calls) = Probe::new();
    net.add_component(w_in, w_out, probe).unwrap();

    let mut sim = Simulation::new(net, w_in, |_t| 1.0, 0.1).unwrap();
    sim.reset();
    sim.advance().unwrap();

    assert_eq!(Probe::count(&calls), 1);
    assert!(sim.wire_by_name("Out").is_none());
    assert_eq!(sim.netlist().wire(w_out).unwrap().history(), &[1.0]);
    assert!(!sim.netlist().wire(w_out).unwrap().is_dirty());
}

#[test]
fn reset_clears_wires_of_unregistered_readers() {
    let mut net = Netlist::new();
    let w_in = net.add_wire("In");
    let w_out = net.add_wire("Out");
    net.add_component(w_in, w_out, Accumulator::new()).unwrap();

    let mut sim = Simulation::new(net, w_in, |_t| 1.0, 0.1).unwrap();
    for _ in 0..3 {
        sim.reset();
        for _ in 0..4 {
            sim.advance().unwrap();
        }
        let out = sim.netlist().wire(w_out).unwrap();
        assert_eq!(out.history(), &[1.0, 2.0, 3.0, 4.0]);
        assert!(!out.is_dirty());
    }
}

#[test]
fn topology_lists_registered_wiring() {
    let mut net = Netlist::new();
    let w1 = net.add_wire("W1");
    let w2 = net.add_wire("W2");
    let w3 = net.add_wire("W3");
    let a = net.add_component(w1, w2, Affine::new(1.0, 0.0)).unwrap();
    let b = net.add_component(w1, w3, Accumulator::new()).unwrap();

    let mut sim = Simulation::new(net, w1, |_t| 1.0, 0.1).unwrap();
    sim.add_component(a).unwrap();
    sim.add_component(b).unwrap();

    let topo = sim.topology();
    assert_eq!(topo.wires.len(), 3);
    assert_eq!(topo.readers(w1), vec![a, b]);
    assert_eq!(topo.writers(w3), vec![b]);
    assert_eq!(topo.component(b).unwrap().kind, "Accumulator");
    assert_eq!(topo.wire(w1).unwrap().effects, vec![a, b]);
    assert_eq!(topo.settle_depth(), Some(1));
}

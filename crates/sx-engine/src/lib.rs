//! sx-engine: discrete-time wire/component propagation engine.
//!
//! Provides:
//! - `Wire`: named scalar signal with value history and an effects list
//! - `Component`: the two-operation stage contract (`tick`, `reset`)
//! - `Netlist`: arena that owns wires and components and hands out handles
//! - `Simulation`: logical clock plus the per-tick settle loop
//! - `Topology`: read-only snapshot for diagnostics
//!
//! # Example
//!
//! ```
//! use sx_engine::{Component, Netlist, Simulation};
//!
//! struct Double;
//!
//! impl Component for Double {
//!     fn kind(&self) -> &'static str {
//!         "Double"
//!     }
//!
//!     fn tick(&mut self, _time: f64, input: f64) -> Option<f64> {
//!         Some(2.0 * input)
//!     }
//! }
//!
//! let mut net = Netlist::new();
//! let w_in = net.add_wire("Input");
//! let w_out = net.add_wire("Doubled");
//! let comp = net.add_component(w_in, w_out, Double).unwrap();
//!
//! let mut sim = Simulation::new(net, w_in, |_t| 1.5, 0.1).unwrap();
//! sim.add_component(comp).unwrap();
//! sim.reset();
//! sim.advance().unwrap();
//!
//! assert_eq!(sim.wire(w_out).unwrap().history(), &[3.0]);
//! ```

pub mod component;
pub mod error;
pub mod netlist;
pub mod simulation;
pub mod topology;
pub mod wire;

pub use component::{Component, ComponentSlot};
pub use error::{SimError, SimResult};
pub use netlist::Netlist;
pub use simulation::{InputFn, SimOptions, Simulation, TickReport};
pub use topology::{ComponentInfo, Topology, WireInfo};
pub use wire::Wire;

pub use sx_core::{CompId, Real, WireId};

/// Engine version, part of every cached run's identity.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

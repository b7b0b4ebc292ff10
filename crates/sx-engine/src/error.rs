//! Error types for engine operations.

use sx_core::{CompId, Real, SxError, WireId};
use thiserror::Error;

/// Errors raised while assembling or advancing a simulation.
///
/// Wire values are never validated; NaN and infinities propagate through
/// the settle loop untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {0}")]
    InvalidArg(#[from] SxError),

    #[error("Wire {id} is not part of this netlist")]
    UnknownWire { id: WireId },

    #[error("Component {id} is not part of this netlist")]
    UnknownComponent { id: CompId },

    #[error("Tick at t={time} did not settle within {passes} passes; the topology is likely cyclic")]
    NoConvergence { time: Real, passes: usize },
}

pub type SimResult<T> = Result<T, SimError>;

use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable handle into one of the engine arenas.
///
/// - `u32` keeps effect lists small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based arena slot by storing slot+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based arena slot.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Arena slot as a `usize`, for indexing vectors.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Handle of a wire in a netlist.
pub type WireId = Id;
/// Handle of a component in a netlist.
pub type CompId = Id;

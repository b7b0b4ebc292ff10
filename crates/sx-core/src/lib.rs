//! sx-core: stable foundation for simplexsim.
//!
//! Contains:
//! - numeric (Real, validators, period helpers)
//! - ids (compact arena handles for wires and components)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::SxError;
pub use ids::*;
pub use numeric::*;

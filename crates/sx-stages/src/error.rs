//! Error types for stage construction.

use sx_core::SxError;
use thiserror::Error;

/// Errors raised while building a stage or generator from parameters.
///
/// Ticking a stage never fails; all checks happen up front.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("Invalid parameter: {0}")]
    Param(#[from] SxError),

    #[error("Invalid bitstream: {what}")]
    Bitstream { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type StageResult<T> = Result<T, StageError>;

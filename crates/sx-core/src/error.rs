use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SxError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Value for {what} must be positive, got {value}")]
    NotPositive { what: &'static str, value: f64 },
}

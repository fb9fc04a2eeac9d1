use thiserror::Error;

/// Errors originating from the numeric core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid iteration budget: {0} (must be >= 1)")]
    InvalidBudget(u32),

    #[error("invalid render window: {reason}")]
    InvalidWindow { reason: String },

    #[error("invalid precision: {0} bits (must be >= 2)")]
    InvalidPrecision(u32),

    #[error("invalid number: {input:?}")]
    InvalidNumber { input: String },
}

//! # Core Error Types
//!
//! The shared error taxonomy for the Cinder protocol. Every failure is a
//! synchronous rejection; callers observe zero state mutation on error.

use thiserror::Error;

/// Protocol errors shared across the ledger crates
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CinderCoreError {
    // ========================================================================
    // Authorization Errors
    // ========================================================================
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Caller is not a rebase operator")]
    NotOperator,

    // ========================================================================
    // Rebase Gating Errors
    // ========================================================================
    #[error("Outside the rebase window")]
    OutsideRebaseWindow,

    #[error("Too soon since the last rebase")]
    TooSoonSinceLastRebase,

    #[error("Oracle data invalid")]
    OracleDataInvalid,

    // ========================================================================
    // Parameter Validation Errors
    // ========================================================================
    #[error("Invalid rebase timing parameters")]
    InvalidTimingParameters,

    #[error("Invalid rebase curve parameters")]
    InvalidCurveParameters,

    #[error("Invalid parameter")]
    InvalidParameter,

    // ========================================================================
    // Math Errors
    // ========================================================================
    #[error("Math overflow")]
    MathOverflow,

    #[error("Math underflow")]
    MathUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    // ========================================================================
    // Ledger Errors
    // ========================================================================
    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Insufficient allowance")]
    InsufficientAllowance,
}

/// Result type using core errors
pub type CoreResult<T> = Result<T, CinderCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", CinderCoreError::TooSoonSinceLastRebase),
            "Too soon since the last rebase"
        );
        assert_eq!(format!("{}", CinderCoreError::Unauthorized), "Unauthorized");
    }
}

//! # Protocol Constants
//!
//! Fundamental constants for the Cinder protocol including:
//! - Fixed-point scale factors
//! - Rate and supply ceilings
//! - Default rebase policy parameters
//! - Token supply constants

// ============================================================================
// Fixed-Point Scale Factors
// ============================================================================

/// 18-decimal fixed-point unit: 10^18
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// Signed 18-decimal fixed-point unit
pub const ONE_I: i128 = ONE as i128;

/// Denominator converting an 18-decimal percentage into a supply fraction
/// (100% expressed in 18-decimal fixed point)
pub const PERCENT_SCALE: u128 = 100 * ONE;

/// ln(2) in 18-decimal fixed point
pub const LN_2: u128 = 693_147_180_559_945_309;

// ============================================================================
// Rate and Supply Ceilings
// ============================================================================

/// Exchange-rate ceiling (one million in 18-decimal units). Oracle rates are
/// clamped here before curve evaluation; every rate at or above the ceiling
/// produces the same adjustment as the ceiling itself.
pub const MAX_RATE: u128 = 1_000_000_000_000_000_000_000_000;

/// Supply ceiling, chosen so `supply * percentage` products fit in `u128`
/// for any percentage the curve can emit.
pub const MAX_SUPPLY: u128 = u128::MAX / PERCENT_SCALE;

// ============================================================================
// Default Policy Parameters
// ============================================================================

/// Default deviation threshold (5%, 18-decimal)
pub const DEFAULT_DEVIATION_THRESHOLD: u128 = 50_000_000_000_000_000;

/// Default rebase lag divisor (vestigial damping parameter)
pub const DEFAULT_REBASE_LAG: u64 = 1;

/// Default minimum interval between rebases (24 hours)
pub const DEFAULT_MIN_REBASE_INTERVAL_SEC: u64 = 86_400;

/// Default rebase window offset past the interval boundary (2 hours)
pub const DEFAULT_REBASE_WINDOW_OFFSET_SEC: u64 = 7_200;

/// Default rebase window length (20 minutes)
pub const DEFAULT_REBASE_WINDOW_LENGTH_SEC: u64 = 1_200;

/// Default response-curve growth (3.0, 18-decimal)
pub const DEFAULT_REBASE_FUNCTION_GROWTH: i128 = 3 * ONE_I;

/// Default response-curve lower bound (-10%, 18-decimal percentage)
pub const DEFAULT_REBASE_FUNCTION_LOWER_PCT: i128 = -10 * ONE_I;

/// Default response-curve upper bound (+10%, 18-decimal percentage)
pub const DEFAULT_REBASE_FUNCTION_UPPER_PCT: i128 = 10 * ONE_I;

// ============================================================================
// Token Supply Constants
// ============================================================================

/// Decimals of the rebasing supply token
pub const SUPPLY_DECIMALS: u32 = 9;

/// Decimals of the non-rebasing wrapper token
pub const WRAPPER_DECIMALS: u32 = 18;

/// Initial (and reference) supply of the rebasing token: 50M, 9 decimals
pub const INITIAL_SUPPLY: u128 = 50_000_000_000_000_000;

/// Total scaled units backing the rebasing ledger. Picked as the largest
/// multiple of `INITIAL_SUPPLY` that fits a `u128`, so the initial
/// units-per-fragment conversion is exact.
pub const TOTAL_SCALED_UNITS: u128 = u128::MAX - (u128::MAX % INITIAL_SUPPLY);

/// Wrapper supply corresponding to the full reference underlying supply:
/// 10M, 18 decimals
pub const MAX_WRAPPER_SUPPLY: u128 = 10_000_000_000_000_000_000_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_validity() {
        assert_eq!(ONE, 10u128.pow(18));
        assert_eq!(MAX_RATE, 10u128.pow(24));
        assert_eq!(DEFAULT_DEVIATION_THRESHOLD, ONE / 20);
        assert!(INITIAL_SUPPLY < MAX_SUPPLY);
        assert_eq!(TOTAL_SCALED_UNITS % INITIAL_SUPPLY, 0);
    }

    #[test]
    fn test_timing_defaults_within_interval() {
        assert!(
            DEFAULT_REBASE_WINDOW_OFFSET_SEC + DEFAULT_REBASE_WINDOW_LENGTH_SEC
                <= DEFAULT_MIN_REBASE_INTERVAL_SEC
        );
    }

    #[test]
    fn test_supply_percentage_product_fits() {
        // MAX_SUPPLY is defined so this product cannot overflow.
        assert!(MAX_SUPPLY.checked_mul(PERCENT_SCALE).is_some());
    }
}

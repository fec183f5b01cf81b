//! # Rebase Response Curve
//!
//! The pure numeric half of the rebase policy: rate normalization, the
//! deviation-threshold predicate, the logistic response curve, and the
//! percentage-to-supply-delta conversion. Nothing in here touches timing
//! or contract state, so every property is unit-testable in isolation.
//!
//! The curve maps the normalized deviation `d = rate/target - 1` to a
//! signed 18-decimal percentage of supply:
//!
//! ```text
//! p(d) = l*(u - l) / (l - u * 2^(-g*d)) + l
//! ```
//!
//! with `l <= 0 <= u` the configured bounds and `g >= 0` the growth. The
//! form is anchored at `p(0) = 0`, monotone in `d`, and saturates exactly
//! to `u` / `l` once the exponent magnitude crosses the fixed-point
//! underflow horizon. When the exponent is negative the expression is
//! multiplied through by `2^(g*d)` so every intermediate stays in range.

use crate::constants::{MAX_RATE, ONE, ONE_I, PERCENT_SCALE};
use crate::errors::{CinderCoreError, CoreResult};
use crate::math::{exp2_neg, mul_div, mul_div_signed, safe_add_i128, safe_sub_i128};

/// Clamp an oracle rate to the protocol ceiling. Monotone saturation:
/// every rate at or above `MAX_RATE` behaves like `MAX_RATE`.
pub fn clamp_rate(rate: u128) -> u128 {
    rate.min(MAX_RATE)
}

/// True when the rate is close enough to the target that no adjustment
/// should be made. A zero threshold disables the short-circuit.
pub fn within_deviation_threshold(
    rate: u128,
    target_rate: u128,
    deviation_threshold: u128,
) -> CoreResult<bool> {
    if deviation_threshold == 0 {
        return Ok(false);
    }
    let band = mul_div(target_rate, deviation_threshold, ONE)?;
    Ok(rate.abs_diff(target_rate) < band)
}

/// Normalize a rate against the target: `rate * ONE / target`, saturating
/// to `i128::MAX` for targets small enough to overflow the quotient (the
/// curve exponent saturates anyway at that magnitude).
pub fn normalized_rate(rate: u128, target_rate: u128) -> CoreResult<i128> {
    if target_rate == 0 {
        return Err(CinderCoreError::DivisionByZero);
    }
    match mul_div(rate, ONE, target_rate) {
        Ok(n) if n <= i128::MAX as u128 => Ok(n as i128),
        Ok(_) | Err(CinderCoreError::MathOverflow) => Ok(i128::MAX),
        Err(e) => Err(e),
    }
}

/// Evaluate the response curve.
///
/// `normalized` is `rate * ONE / target`; `lower <= 0 <= upper` are
/// 18-decimal percentages; `growth >= 0` is an 18-decimal scalar. The
/// result is a percentage in `[lower, upper]`.
pub fn rebase_percentage(
    normalized: i128,
    lower: i128,
    upper: i128,
    growth: i128,
) -> CoreResult<i128> {
    if lower > 0 || upper < 0 || growth < 0 {
        return Err(CinderCoreError::InvalidCurveParameters);
    }

    let delta = safe_sub_i128(normalized, ONE_I)?;
    // A zero bound anchors the whole logistic at zero: the curve passes
    // through p(0) = 0 and its asymptote on that side coincides with it.
    if delta == 0 || lower == 0 || upper == 0 {
        return Ok(0);
    }

    // Exponent g*d in 18-decimal units; overflow means the curve is deep
    // into saturation, so the sign alone decides the outcome.
    let exponent = match growth.checked_mul(delta) {
        Some(product) => product / ONE_I,
        None => {
            if delta > 0 {
                i128::MAX
            } else {
                i128::MIN
            }
        }
    };

    let span = safe_sub_i128(upper, lower)?;

    if exponent >= 0 {
        // p = l*(u-l) / (l - u*t) + l, with t = 2^(-exponent)
        let t = exp2_neg(exponent as u128);
        if t == 0 {
            return Ok(upper);
        }
        let ut = mul_div_signed(upper, t as i128, ONE_I)?;
        // lower < 0 strictly here, so the denominator is never zero
        let denom = safe_sub_i128(lower, ut)?;
        let quotient = mul_div_signed(lower, span, denom)?;
        safe_add_i128(quotient, lower)
    } else {
        // Multiplied through by t = 2^(exponent):
        // p = l*(u-l)*t / (l*t - u) + l
        let t = exp2_neg(exponent.unsigned_abs());
        if t == 0 {
            return Ok(lower);
        }
        let lt = mul_div_signed(lower, t as i128, ONE_I)?;
        // upper > 0 strictly here, so the denominator is never zero
        let denom = safe_sub_i128(lt, upper)?;
        let quotient = mul_div_signed(lower, span, denom)?;
        let scaled = mul_div_signed(quotient, t as i128, ONE_I)?;
        safe_add_i128(scaled, lower)
    }
}

/// Convert a curve percentage into an absolute signed supply delta:
/// `supply * p / (100 * ONE)`, truncating toward zero.
pub fn supply_delta(total_supply: u128, percentage: i128) -> CoreResult<i128> {
    let magnitude = mul_div(total_supply, percentage.unsigned_abs(), PERCENT_SCALE)?;
    if magnitude > i128::MAX as u128 {
        return Err(CinderCoreError::MathOverflow);
    }
    if percentage < 0 {
        Ok(-(magnitude as i128))
    } else {
        Ok(magnitude as i128)
    }
}

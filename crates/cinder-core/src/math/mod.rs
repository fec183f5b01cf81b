//! # Math Module
//!
//! Overflow-safe integer and 18-decimal fixed-point arithmetic used by the
//! rebase policy and the token ledgers.

pub mod big_int;
pub mod exp2;
pub mod safe_math;

pub use big_int::{mul_div, mul_div_signed, U256};
pub use exp2::exp2_neg;
pub use safe_math::*;

//! # Cinder Rebase Policy
//!
//! The access-controlled policy engine that periodically adjusts the supply
//! token based on an external exchange-rate signal: operator allow-list,
//! oracle seam, timing gate, response-curve evaluation and the atomic
//! rebase commit.

pub mod engine;
pub mod operators;
pub mod oracle;

pub use engine::{RebasePolicyEngine, RebaseReport};
pub use operators::OperatorSet;
pub use oracle::StoredRateOracle;

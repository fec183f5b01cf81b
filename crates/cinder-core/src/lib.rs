//! # Cinder Core - Shared Protocol Logic
//!
//! This crate contains the types and mathematical logic shared between the
//! Cinder ledger crates and off-chain services. It provides:
//!
//! - Protocol constants and default policy parameters
//! - The shared error taxonomy
//! - Overflow-checked fixed-point arithmetic (18-decimal, `U256` widened)
//! - The pure rebase response curve

// Re-export all modules
pub mod address;
pub mod constants;
pub mod curve;
pub mod errors;
pub mod math;
pub mod traits;

// Re-export commonly used items
pub use address::Address;
pub use constants::*;
pub use errors::{CinderCoreError, CoreResult};
pub use traits::{MarketOracle, RebasableLedger};

//! # Collaborator Interfaces
//!
//! The seams between the policy engine and its external collaborators: the
//! market oracle it reads and the supply ledger it adjusts.

use crate::address::Address;
use crate::errors::CoreResult;

/// Source of the external exchange rate.
pub trait MarketOracle {
    /// Returns the current rate (18-decimal fixed point) and whether the
    /// report is valid. An invalid report must not be acted on.
    fn get_data(&self) -> (u128, bool);
}

/// A token ledger whose total supply can be adjusted by a monetary policy.
pub trait RebasableLedger {
    /// Current total supply in fragment units.
    fn total_supply(&self) -> u128;

    /// Apply a signed supply adjustment for the given epoch. Only the
    /// configured monetary policy address may call this. Returns the total
    /// supply after the adjustment.
    fn rebase(&mut self, caller: Address, epoch: u64, supply_delta: i128) -> CoreResult<u128>;
}

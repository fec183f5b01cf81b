//! # Rebasing Supply Token
//!
//! Fragment balances are a view over a fixed pool of indivisible scaled
//! units: each holder owns a constant number of units, and a rebase only
//! moves the units-per-fragment conversion factor. Proportional ownership
//! is therefore invariant across rebases by construction.

use std::collections::HashMap;

use cinder_core::constants::{INITIAL_SUPPLY, MAX_SUPPLY, TOTAL_SCALED_UNITS};
use cinder_core::errors::{CinderCoreError, CoreResult};
use cinder_core::math::safe_add_supply_delta;
use cinder_core::{Address, RebasableLedger};

/// The rebasing token ledger
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SupplyToken {
    owner: Address,
    /// The only address allowed to call `rebase`; unset until configured
    monetary_policy: Address,
    total_supply: u128,
    scaled_per_fragment: u128,
    /// Epoch of the last applied rebase
    last_rebase_epoch: u64,
    /// Balances in scaled units
    balances: HashMap<Address, u128>,
    /// Allowances in fragment units, keyed by (holder, spender)
    allowances: HashMap<(Address, Address), u128>,
}

impl SupplyToken {
    /// Create the ledger with the full initial supply credited to `owner`.
    pub fn new(owner: Address) -> Self {
        let mut balances = HashMap::new();
        balances.insert(owner, TOTAL_SCALED_UNITS);
        Self {
            owner,
            monetary_policy: Address::ZERO,
            total_supply: INITIAL_SUPPLY,
            scaled_per_fragment: TOTAL_SCALED_UNITS / INITIAL_SUPPLY,
            last_rebase_epoch: 0,
            balances,
            allowances: HashMap::new(),
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn monetary_policy(&self) -> Address {
        self.monetary_policy
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn last_rebase_epoch(&self) -> u64 {
        self.last_rebase_epoch
    }

    /// Balance in fragment units
    pub fn balance_of(&self, who: Address) -> u128 {
        self.scaled_balance_of(who) / self.scaled_per_fragment
    }

    /// Balance in scaled units
    pub fn scaled_balance_of(&self, who: Address) -> u128 {
        self.balances.get(&who).copied().unwrap_or(0)
    }

    pub fn allowance(&self, holder: Address, spender: Address) -> u128 {
        self.allowances.get(&(holder, spender)).copied().unwrap_or(0)
    }

    // ========================================================================
    // Transfers and Allowances
    // ========================================================================

    pub fn transfer(&mut self, caller: Address, to: Address, amount: u128) -> CoreResult<()> {
        self.move_fragments(caller, to, amount)
    }

    /// Transfer the caller's entire balance, scaled-units exact (no dust
    /// left behind from the fragment conversion).
    pub fn transfer_all(&mut self, caller: Address, to: Address) -> CoreResult<()> {
        let scaled = self.scaled_balance_of(caller);
        self.move_scaled(caller, to, scaled)
    }

    pub fn approve(&mut self, caller: Address, spender: Address, amount: u128) {
        self.allowances.insert((caller, spender), amount);
    }

    pub fn increase_allowance(
        &mut self,
        caller: Address,
        spender: Address,
        added: u128,
    ) -> CoreResult<()> {
        let current = self.allowance(caller, spender);
        let next = current
            .checked_add(added)
            .ok_or(CinderCoreError::MathOverflow)?;
        self.allowances.insert((caller, spender), next);
        Ok(())
    }

    pub fn decrease_allowance(&mut self, caller: Address, spender: Address, removed: u128) {
        let current = self.allowance(caller, spender);
        self.allowances
            .insert((caller, spender), current.saturating_sub(removed));
    }

    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> CoreResult<()> {
        let allowed = self.allowance(from, caller);
        if allowed < amount {
            return Err(CinderCoreError::InsufficientAllowance);
        }
        self.move_fragments(from, to, amount)?;
        self.allowances.insert((from, caller), allowed - amount);
        Ok(())
    }

    // ========================================================================
    // Monetary Policy
    // ========================================================================

    pub fn set_monetary_policy(&mut self, caller: Address, policy: Address) -> CoreResult<()> {
        if caller != self.owner {
            return Err(CinderCoreError::Unauthorized);
        }
        self.monetary_policy = policy;
        Ok(())
    }

    fn apply_rebase(&mut self, caller: Address, epoch: u64, supply_delta: i128) -> CoreResult<u128> {
        if self.monetary_policy.is_zero() || caller != self.monetary_policy {
            return Err(CinderCoreError::Unauthorized);
        }
        if supply_delta == 0 {
            self.last_rebase_epoch = epoch;
            return Ok(self.total_supply);
        }

        let new_supply = safe_add_supply_delta(self.total_supply, supply_delta)?.min(MAX_SUPPLY);
        if new_supply == 0 {
            // A supply of zero has no scaled-unit conversion
            return Err(CinderCoreError::MathUnderflow);
        }

        self.total_supply = new_supply;
        self.scaled_per_fragment = TOTAL_SCALED_UNITS / new_supply;
        self.last_rebase_epoch = epoch;
        Ok(new_supply)
    }

    // ========================================================================
    // Internal Moves
    // ========================================================================

    fn move_fragments(&mut self, from: Address, to: Address, amount: u128) -> CoreResult<()> {
        if amount > self.balance_of(from) {
            return Err(CinderCoreError::InsufficientBalance);
        }
        // amount <= balance <= total supply, so this cannot overflow
        let scaled = amount * self.scaled_per_fragment;
        self.move_scaled(from, to, scaled)
    }

    fn move_scaled(&mut self, from: Address, to: Address, scaled: u128) -> CoreResult<()> {
        let from_balance = self.scaled_balance_of(from);
        if scaled > from_balance {
            return Err(CinderCoreError::InsufficientBalance);
        }
        self.balances.insert(from, from_balance - scaled);
        let to_balance = self.scaled_balance_of(to);
        self.balances.insert(to, to_balance + scaled);
        Ok(())
    }
}

impl RebasableLedger for SupplyToken {
    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn rebase(&mut self, caller: Address, epoch: u64, supply_delta: i128) -> CoreResult<u128> {
        self.apply_rebase(caller, epoch, supply_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address::from_low_u64(1);
    const POLICY: Address = Address::from_low_u64(2);
    const ALICE: Address = Address::from_low_u64(10);
    const BOB: Address = Address::from_low_u64(11);

    fn setup() -> SupplyToken {
        let mut token = SupplyToken::new(OWNER);
        token.set_monetary_policy(OWNER, POLICY).unwrap();
        token
    }

    #[test]
    fn test_initial_state() {
        let token = SupplyToken::new(OWNER);
        assert_eq!(token.total_supply(), INITIAL_SUPPLY);
        assert_eq!(token.balance_of(OWNER), INITIAL_SUPPLY);
        assert_eq!(token.balance_of(ALICE), 0);
        assert_eq!(token.last_rebase_epoch(), 0);
        assert!(token.monetary_policy().is_zero());
    }

    #[test]
    fn test_transfer() {
        let mut token = setup();
        token.transfer(OWNER, ALICE, 1_000).unwrap();
        assert_eq!(token.balance_of(ALICE), 1_000);
        assert_eq!(token.balance_of(OWNER), INITIAL_SUPPLY - 1_000);
        assert_eq!(
            token.transfer(ALICE, BOB, 1_001),
            Err(CinderCoreError::InsufficientBalance)
        );
    }

    #[test]
    fn test_transfer_all() {
        let mut token = setup();
        token.transfer(OWNER, ALICE, 1_000).unwrap();
        token.transfer_all(ALICE, BOB).unwrap();
        assert_eq!(token.balance_of(ALICE), 0);
        assert_eq!(token.scaled_balance_of(ALICE), 0);
        assert_eq!(token.balance_of(BOB), 1_000);
    }

    #[test]
    fn test_allowance_flow() {
        let mut token = setup();
        token.transfer(OWNER, ALICE, 500).unwrap();
        token.approve(ALICE, BOB, 300);
        assert_eq!(token.allowance(ALICE, BOB), 300);

        token.transfer_from(BOB, ALICE, BOB, 200).unwrap();
        assert_eq!(token.balance_of(BOB), 200);
        assert_eq!(token.allowance(ALICE, BOB), 100);

        assert_eq!(
            token.transfer_from(BOB, ALICE, BOB, 150),
            Err(CinderCoreError::InsufficientAllowance)
        );

        token.increase_allowance(ALICE, BOB, 50).unwrap();
        assert_eq!(token.allowance(ALICE, BOB), 150);
        token.decrease_allowance(ALICE, BOB, 500);
        assert_eq!(token.allowance(ALICE, BOB), 0);
    }

    #[test]
    fn test_rebase_requires_policy() {
        let mut token = setup();
        assert_eq!(
            token.apply_rebase(OWNER, 1, 100),
            Err(CinderCoreError::Unauthorized)
        );

        let mut unset = SupplyToken::new(OWNER);
        assert_eq!(
            unset.apply_rebase(Address::ZERO, 1, 100),
            Err(CinderCoreError::Unauthorized)
        );
    }

    #[test]
    fn test_rebase_preserves_proportions() {
        let mut token = setup();
        token.transfer(OWNER, ALICE, 10_000).unwrap();
        token.transfer(OWNER, BOB, 20_000).unwrap();

        let supply = token.total_supply();
        let new_supply = token
            .apply_rebase(POLICY, 1, (supply / 10) as i128)
            .unwrap();
        assert_eq!(new_supply, supply + supply / 10);
        assert_eq!(token.last_rebase_epoch(), 1);

        // Both holders grew ~10% and kept their 1:2 ratio exactly.
        let alice = token.balance_of(ALICE);
        let bob = token.balance_of(BOB);
        assert_eq!(token.scaled_balance_of(BOB), 2 * token.scaled_balance_of(ALICE));
        assert!(alice >= 10_999 && alice <= 11_000, "alice = {alice}");
        assert!(bob >= 21_999 && bob <= 22_000, "bob = {bob}");

        // Contraction mirrors the move.
        let supply = token.total_supply();
        token
            .apply_rebase(POLICY, 2, -((supply / 4) as i128))
            .unwrap();
        assert_eq!(token.scaled_balance_of(BOB), 2 * token.scaled_balance_of(ALICE));
    }

    #[test]
    fn test_rebase_zero_delta_is_noop() {
        let mut token = setup();
        let before = token.clone();
        let supply = token.apply_rebase(POLICY, 7, 0).unwrap();
        assert_eq!(supply, INITIAL_SUPPLY);
        assert_eq!(token.total_supply(), before.total_supply());
        assert_eq!(token.balance_of(OWNER), before.balance_of(OWNER));
        assert_eq!(token.last_rebase_epoch(), 7);
    }

    #[test]
    fn test_rebase_clamps_to_max_supply() {
        let mut token = setup();
        let supply = token.apply_rebase(POLICY, 1, i128::MAX).unwrap();
        assert_eq!(supply, MAX_SUPPLY);
        assert_eq!(token.total_supply(), MAX_SUPPLY);
    }

    #[test]
    fn test_rebase_cannot_extinguish_supply() {
        let mut token = setup();
        assert_eq!(
            token.apply_rebase(POLICY, 1, -(INITIAL_SUPPLY as i128)),
            Err(CinderCoreError::MathUnderflow)
        );
        // Over-contraction underflows rather than wrapping.
        assert_eq!(
            token.apply_rebase(POLICY, 1, -(INITIAL_SUPPLY as i128) - 1),
            Err(CinderCoreError::MathUnderflow)
        );
        assert_eq!(token.total_supply(), INITIAL_SUPPLY);
    }

    #[test]
    fn test_set_monetary_policy_access() {
        let mut token = SupplyToken::new(OWNER);
        assert_eq!(
            token.set_monetary_policy(ALICE, POLICY),
            Err(CinderCoreError::Unauthorized)
        );
        token.set_monetary_policy(OWNER, POLICY).unwrap();
        assert_eq!(token.monetary_policy(), POLICY);
    }
}

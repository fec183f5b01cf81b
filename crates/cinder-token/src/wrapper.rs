//! # Wrapper Token
//!
//! A non-rebasing 18-decimal token over the 9-decimal rebasing asset. The
//! conversion between the two units is a fixed linear scale anchored at the
//! reference supplies, so a wrapper balance is a constant fraction of the
//! reference supply regardless of rebases on the underlying.

use std::collections::HashMap;

use cinder_core::constants::{INITIAL_SUPPLY, MAX_WRAPPER_SUPPLY};
use cinder_core::errors::{CinderCoreError, CoreResult};
use cinder_core::math::mul_div;
use cinder_core::Address;

use crate::supply_token::SupplyToken;

/// The wrapper token ledger. Underlying custody sits on the wrapper's own
/// address in the supply-token ledger.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WrapperToken {
    address: Address,
    name: String,
    symbol: String,
    total_supply: u128,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
}

/// Convert an underlying amount into wrapper units (truncating)
pub fn underlying_to_wrapper(amount: u128) -> CoreResult<u128> {
    mul_div(amount, MAX_WRAPPER_SUPPLY, INITIAL_SUPPLY)
}

/// Convert a wrapper amount into underlying units (truncating)
pub fn wrapper_to_underlying(amount: u128) -> CoreResult<u128> {
    mul_div(amount, INITIAL_SUPPLY, MAX_WRAPPER_SUPPLY)
}

impl WrapperToken {
    pub fn new(address: Address, name: &str, symbol: &str) -> Self {
        Self {
            address,
            name: name.to_string(),
            symbol: symbol.to_string(),
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u32 {
        cinder_core::constants::WRAPPER_DECIMALS
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, who: Address) -> u128 {
        self.balances.get(&who).copied().unwrap_or(0)
    }

    pub fn allowance(&self, holder: Address, spender: Address) -> u128 {
        self.allowances.get(&(holder, spender)).copied().unwrap_or(0)
    }

    /// Underlying tokens held in custody
    pub fn total_underlying(&self, underlying: &SupplyToken) -> u128 {
        underlying.balance_of(self.address)
    }

    /// The underlying value of a holder's wrapper balance
    pub fn balance_of_underlying(&self, who: Address) -> CoreResult<u128> {
        wrapper_to_underlying(self.balance_of(who))
    }

    // ========================================================================
    // Deposit / Withdraw (amounts in underlying units)
    // ========================================================================

    /// Deposit underlying, minting the linear-equivalent wrapper amount to
    /// the caller. Returns the wrapper amount minted.
    pub fn deposit(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        amount: u128,
    ) -> CoreResult<u128> {
        self.deposit_for(underlying, caller, caller, amount)
    }

    /// Deposit variant crediting `to`.
    pub fn deposit_for(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        to: Address,
        amount: u128,
    ) -> CoreResult<u128> {
        let minted = underlying_to_wrapper(amount)?;
        underlying.transfer_from(self.address, caller, self.address, amount)?;
        self.mint_to(to, minted)?;
        Ok(minted)
    }

    /// Withdraw an underlying amount, burning the linear-equivalent wrapper
    /// amount from the caller. Returns the wrapper amount burned.
    pub fn withdraw(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        amount: u128,
    ) -> CoreResult<u128> {
        self.withdraw_to(underlying, caller, caller, amount)
    }

    /// Withdraw variant paying out to `to`.
    pub fn withdraw_to(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        to: Address,
        amount: u128,
    ) -> CoreResult<u128> {
        let burned = underlying_to_wrapper(amount)?;
        if burned > self.balance_of(caller) {
            return Err(CinderCoreError::InsufficientBalance);
        }
        underlying.transfer(self.address, to, amount)?;
        self.burn_from(caller, burned)?;
        Ok(burned)
    }

    /// Withdraw the caller's entire position. Returns the underlying paid out.
    pub fn withdraw_all(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
    ) -> CoreResult<u128> {
        self.withdraw_all_to(underlying, caller, caller)
    }

    pub fn withdraw_all_to(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        to: Address,
    ) -> CoreResult<u128> {
        let wrapper_amount = self.balance_of(caller);
        let amount = wrapper_to_underlying(wrapper_amount)?;
        underlying.transfer(self.address, to, amount)?;
        self.burn_from(caller, wrapper_amount)?;
        Ok(amount)
    }

    // ========================================================================
    // Mint / Burn (amounts in wrapper units)
    // ========================================================================

    /// Mint an exact wrapper amount, pulling the linear-equivalent
    /// underlying from the caller. Returns the underlying deposited.
    pub fn mint(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        wrapper_amount: u128,
    ) -> CoreResult<u128> {
        self.mint_for(underlying, caller, caller, wrapper_amount)
    }

    pub fn mint_for(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        to: Address,
        wrapper_amount: u128,
    ) -> CoreResult<u128> {
        let amount = wrapper_to_underlying(wrapper_amount)?;
        underlying.transfer_from(self.address, caller, self.address, amount)?;
        self.mint_to(to, wrapper_amount)?;
        Ok(amount)
    }

    /// Burn an exact wrapper amount, paying out the linear-equivalent
    /// underlying. Returns the underlying paid out.
    pub fn burn(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        wrapper_amount: u128,
    ) -> CoreResult<u128> {
        self.burn_to(underlying, caller, caller, wrapper_amount)
    }

    pub fn burn_to(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        to: Address,
        wrapper_amount: u128,
    ) -> CoreResult<u128> {
        let amount = wrapper_to_underlying(wrapper_amount)?;
        if wrapper_amount > self.balance_of(caller) {
            return Err(CinderCoreError::InsufficientBalance);
        }
        underlying.transfer(self.address, to, amount)?;
        self.burn_from(caller, wrapper_amount)?;
        Ok(amount)
    }

    pub fn burn_all(&mut self, underlying: &mut SupplyToken, caller: Address) -> CoreResult<u128> {
        self.burn_all_to(underlying, caller, caller)
    }

    pub fn burn_all_to(
        &mut self,
        underlying: &mut SupplyToken,
        caller: Address,
        to: Address,
    ) -> CoreResult<u128> {
        let wrapper_amount = self.balance_of(caller);
        self.burn_to(underlying, caller, to, wrapper_amount)
    }

    // ========================================================================
    // Transfers and Allowances
    // ========================================================================

    pub fn transfer(&mut self, caller: Address, to: Address, amount: u128) -> CoreResult<()> {
        let from_balance = self.balance_of(caller);
        if amount > from_balance {
            return Err(CinderCoreError::InsufficientBalance);
        }
        self.balances.insert(caller, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.insert(to, to_balance + amount);
        Ok(())
    }

    pub fn approve(&mut self, caller: Address, spender: Address, amount: u128) {
        self.allowances.insert((caller, spender), amount);
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
        let from_balance = self.balance_of(from);
        if amount > from_balance {
            return Err(CinderCoreError::InsufficientBalance);
        }
        self.balances.insert(from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.insert(to, to_balance + amount);
        self.allowances.insert((from, caller), allowed - amount);
        Ok(())
    }

    // ========================================================================
    // Internal Supply Moves
    // ========================================================================

    fn mint_to(&mut self, to: Address, amount: u128) -> CoreResult<()> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(CinderCoreError::MathOverflow)?;
        let balance = self.balance_of(to);
        self.balances.insert(to, balance + amount);
        Ok(())
    }

    fn burn_from(&mut self, from: Address, amount: u128) -> CoreResult<()> {
        let balance = self.balance_of(from);
        if amount > balance {
            return Err(CinderCoreError::InsufficientBalance);
        }
        self.balances.insert(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }
}

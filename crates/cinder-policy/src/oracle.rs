//! # Market Oracle Seam
//!
//! The policy engine only ever sees `(rate, valid)` through the
//! [`MarketOracle`] trait. `StoredRateOracle` is the push-style
//! implementation used by the keeper: its owner stores fresh reports and
//! flips the validity flag when the feed goes stale.

use cinder_core::errors::{CinderCoreError, CoreResult};
use cinder_core::{Address, MarketOracle};

/// An owner-updatable `(rate, valid)` store
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredRateOracle {
    owner: Address,
    rate: u128,
    valid: bool,
}

impl StoredRateOracle {
    /// Starts without a report: reads are invalid until one is stored.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            rate: 0,
            valid: false,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn store_rate(&mut self, caller: Address, rate: u128) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        self.rate = rate;
        self.valid = true;
        Ok(())
    }

    pub fn store_validity(&mut self, caller: Address, valid: bool) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        self.valid = valid;
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> CoreResult<()> {
        if caller != self.owner {
            return Err(CinderCoreError::Unauthorized);
        }
        Ok(())
    }
}

impl MarketOracle for StoredRateOracle {
    fn get_data(&self) -> (u128, bool) {
        (self.rate, self.valid)
    }
}

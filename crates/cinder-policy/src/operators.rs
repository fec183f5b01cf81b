//! # Operator Allow-List
//!
//! A mapping-backed permission set. Administrators add and remove
//! addresses; membership is the sole predicate the policy engine consults
//! before accepting a `rebase` call.

use std::collections::HashSet;

use cinder_core::errors::{CinderCoreError, CoreResult};
use cinder_core::Address;

/// The operator permission set
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OperatorSet {
    owner: Address,
    members: HashSet<Address>,
}

impl OperatorSet {
    /// Create an empty set administered by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            members: HashSet::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Pure membership query, no side effects.
    pub fn is_operator(&self, who: Address) -> bool {
        self.members.contains(&who)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add an operator. Idempotent: re-adding a member is a no-op.
    pub fn add_operator(&mut self, caller: Address, who: Address) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        self.members.insert(who);
        Ok(())
    }

    /// Remove an operator. Idempotent: removing a non-member is a no-op.
    pub fn remove_operator(&mut self, caller: Address, who: Address) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        self.members.remove(&who);
        Ok(())
    }

    /// Bulk variant: applies `enabled` uniformly to every listed address.
    pub fn set_operators(
        &mut self,
        caller: Address,
        addresses: &[Address],
        enabled: bool,
    ) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        for &who in addresses {
            if enabled {
                self.members.insert(who);
            } else {
                self.members.remove(&who);
            }
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> CoreResult<()> {
        if caller != self.owner {
            return Err(CinderCoreError::Unauthorized);
        }
        Ok(())
    }
}

//! # Rebase Policy Engine
//!
//! The state machine that gates, computes and commits supply adjustments:
//! operator gate, recurring-window timing gate, oracle consumption with
//! rate clamping, response-curve evaluation with the deviation-threshold
//! short-circuit, supply-ceiling clamp, and an atomic commit that advances
//! epoch and window-aligned timestamp together with the ledger call.
//!
//! The engine never reads a clock; `now` (unix seconds) is a parameter of
//! every timing-sensitive operation, which keeps the whole state machine
//! deterministic under test.

use cinder_core::constants::{
    DEFAULT_DEVIATION_THRESHOLD, DEFAULT_MIN_REBASE_INTERVAL_SEC, DEFAULT_REBASE_FUNCTION_GROWTH,
    DEFAULT_REBASE_FUNCTION_LOWER_PCT, DEFAULT_REBASE_FUNCTION_UPPER_PCT, DEFAULT_REBASE_LAG,
    DEFAULT_REBASE_WINDOW_LENGTH_SEC, DEFAULT_REBASE_WINDOW_OFFSET_SEC, MAX_SUPPLY,
};
use cinder_core::curve::{
    clamp_rate, normalized_rate, rebase_percentage, supply_delta, within_deviation_threshold,
};
use cinder_core::errors::{CinderCoreError, CoreResult};
use cinder_core::{Address, MarketOracle, RebasableLedger};

use crate::operators::OperatorSet;

/// The structured record of one successful rebase
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RebaseReport {
    pub epoch: u64,
    /// The (ceiling-clamped) exchange rate the adjustment was computed from
    pub exchange_rate: u128,
    pub supply_delta: i128,
    /// Raw call time; the engine's own gating timestamp is window-aligned
    pub timestamp_sec: u64,
}

/// The rebase policy singleton
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebasePolicyEngine<O: MarketOracle> {
    /// The engine's own ledger identity, presented to the supply token
    address: Address,
    owner: Address,
    operators: OperatorSet,
    market_oracle: Option<O>,
    target_rate: u128,
    deviation_threshold: u128,
    /// Legacy damping divisor; validated but not part of the curve math
    rebase_lag: u64,
    min_rebase_time_interval_sec: u64,
    rebase_window_offset_sec: u64,
    rebase_window_length_sec: u64,
    rebase_function_growth: i128,
    rebase_function_lower_percentage: i128,
    rebase_function_upper_percentage: i128,
    epoch: u64,
    last_rebase_timestamp_sec: u64,
    last_epoch: u64,
    last_supply: u128,
}

impl<O: MarketOracle> RebasePolicyEngine<O> {
    /// Create the engine with protocol defaults. The oracle is attached
    /// separately via [`set_market_oracle`](Self::set_market_oracle).
    pub fn new(
        address: Address,
        owner: Address,
        target_rate: u128,
        operators: OperatorSet,
    ) -> CoreResult<Self> {
        if target_rate == 0 {
            return Err(CinderCoreError::InvalidParameter);
        }
        Ok(Self {
            address,
            owner,
            operators,
            market_oracle: None,
            target_rate,
            deviation_threshold: DEFAULT_DEVIATION_THRESHOLD,
            rebase_lag: DEFAULT_REBASE_LAG,
            min_rebase_time_interval_sec: DEFAULT_MIN_REBASE_INTERVAL_SEC,
            rebase_window_offset_sec: DEFAULT_REBASE_WINDOW_OFFSET_SEC,
            rebase_window_length_sec: DEFAULT_REBASE_WINDOW_LENGTH_SEC,
            rebase_function_growth: DEFAULT_REBASE_FUNCTION_GROWTH,
            rebase_function_lower_percentage: DEFAULT_REBASE_FUNCTION_LOWER_PCT,
            rebase_function_upper_percentage: DEFAULT_REBASE_FUNCTION_UPPER_PCT,
            epoch: 0,
            last_rebase_timestamp_sec: 0,
            last_epoch: 0,
            last_supply: 0,
        })
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn operators(&self) -> &OperatorSet {
        &self.operators
    }

    /// Operator management goes through the set's own owner gate.
    pub fn operators_mut(&mut self) -> &mut OperatorSet {
        &mut self.operators
    }

    pub fn market_oracle(&self) -> Option<&O> {
        self.market_oracle.as_ref()
    }

    pub fn market_oracle_mut(&mut self) -> Option<&mut O> {
        self.market_oracle.as_mut()
    }

    pub fn target_rate(&self) -> u128 {
        self.target_rate
    }

    pub fn deviation_threshold(&self) -> u128 {
        self.deviation_threshold
    }

    pub fn rebase_lag(&self) -> u64 {
        self.rebase_lag
    }

    pub fn min_rebase_time_interval_sec(&self) -> u64 {
        self.min_rebase_time_interval_sec
    }

    pub fn rebase_window_offset_sec(&self) -> u64 {
        self.rebase_window_offset_sec
    }

    pub fn rebase_window_length_sec(&self) -> u64 {
        self.rebase_window_length_sec
    }

    pub fn rebase_function_growth(&self) -> i128 {
        self.rebase_function_growth
    }

    pub fn rebase_function_lower_percentage(&self) -> i128 {
        self.rebase_function_lower_percentage
    }

    pub fn rebase_function_upper_percentage(&self) -> i128 {
        self.rebase_function_upper_percentage
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn last_rebase_timestamp_sec(&self) -> u64 {
        self.last_rebase_timestamp_sec
    }

    /// The `(epoch, supply)` snapshot recorded at the last commit, for
    /// external consumers.
    pub fn epoch_and_supply_snapshot(&self) -> (u64, u128) {
        (self.last_epoch, self.last_supply)
    }

    /// True iff `now` falls inside the recurring rebase window.
    pub fn in_rebase_window(&self, now: u64) -> bool {
        let position = now % self.min_rebase_time_interval_sec;
        position >= self.rebase_window_offset_sec
            && position < self.rebase_window_offset_sec + self.rebase_window_length_sec
    }

    // ========================================================================
    // Rebase
    // ========================================================================

    /// Run one rebase. Gates in order: operator, window, once-per-interval,
    /// oracle validity. On success all commit effects land together; on any
    /// error nothing is mutated.
    pub fn rebase(
        &mut self,
        caller: Address,
        now: u64,
        token: &mut impl RebasableLedger,
    ) -> CoreResult<RebaseReport> {
        if !self.operators.is_operator(caller) {
            return Err(CinderCoreError::NotOperator);
        }
        if !self.in_rebase_window(now) {
            return Err(CinderCoreError::OutsideRebaseWindow);
        }
        // Guards against a second commit inside the same window occurrence,
        // including a previous commit that landed exactly on window open.
        if now
            < self
                .last_rebase_timestamp_sec
                .saturating_add(self.min_rebase_time_interval_sec)
        {
            return Err(CinderCoreError::TooSoonSinceLastRebase);
        }

        let oracle = self
            .market_oracle
            .as_ref()
            .ok_or(CinderCoreError::OracleDataInvalid)?;
        let (raw_rate, valid) = oracle.get_data();
        if !valid {
            return Err(CinderCoreError::OracleDataInvalid);
        }
        let rate = clamp_rate(raw_rate);

        let supply = token.total_supply();
        let delta = clamp_to_supply_ceiling(supply, self.compute_supply_delta(rate, supply)?);

        // Normalize the committed timestamp to the window-open boundary so
        // future gating is exact regardless of intra-window call jitter.
        let window_open =
            now - now % self.min_rebase_time_interval_sec + self.rebase_window_offset_sec;
        let new_epoch = self.epoch + 1;

        // The ledger call comes first: if it fails, no engine state moves.
        let new_supply = token.rebase(self.address, new_epoch, delta)?;

        self.epoch = new_epoch;
        self.last_rebase_timestamp_sec = window_open;
        self.last_epoch = new_epoch;
        self.last_supply = new_supply;

        Ok(RebaseReport {
            epoch: new_epoch,
            exchange_rate: rate,
            supply_delta: delta,
            timestamp_sec: now,
        })
    }

    fn compute_supply_delta(&self, rate: u128, supply: u128) -> CoreResult<i128> {
        if within_deviation_threshold(rate, self.target_rate, self.deviation_threshold)? {
            return Ok(0);
        }
        let normalized = normalized_rate(rate, self.target_rate)?;
        let percentage = rebase_percentage(
            normalized,
            self.rebase_function_lower_percentage,
            self.rebase_function_upper_percentage,
            self.rebase_function_growth,
        )?;
        supply_delta(supply, percentage)
    }

    // ========================================================================
    // Admin Setters
    // ========================================================================

    pub fn set_market_oracle(&mut self, caller: Address, oracle: O) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        self.market_oracle = Some(oracle);
        Ok(())
    }

    pub fn set_target_rate(&mut self, caller: Address, target_rate: u128) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        if target_rate == 0 {
            return Err(CinderCoreError::InvalidParameter);
        }
        self.target_rate = target_rate;
        Ok(())
    }

    /// A zero threshold disables the short-circuit entirely.
    pub fn set_deviation_threshold(&mut self, caller: Address, threshold: u128) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        self.deviation_threshold = threshold;
        Ok(())
    }

    pub fn set_rebase_lag(&mut self, caller: Address, lag: u64) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        if lag == 0 {
            return Err(CinderCoreError::InvalidParameter);
        }
        self.rebase_lag = lag;
        Ok(())
    }

    pub fn set_rebase_timing_parameters(
        &mut self,
        caller: Address,
        interval_sec: u64,
        offset_sec: u64,
        length_sec: u64,
    ) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        if interval_sec == 0 {
            return Err(CinderCoreError::InvalidTimingParameters);
        }
        let window_end = offset_sec
            .checked_add(length_sec)
            .ok_or(CinderCoreError::InvalidTimingParameters)?;
        if window_end > interval_sec {
            return Err(CinderCoreError::InvalidTimingParameters);
        }
        self.min_rebase_time_interval_sec = interval_sec;
        self.rebase_window_offset_sec = offset_sec;
        self.rebase_window_length_sec = length_sec;
        Ok(())
    }

    pub fn set_rebase_function_growth(&mut self, caller: Address, growth: i128) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        if growth < 0 {
            return Err(CinderCoreError::InvalidCurveParameters);
        }
        self.rebase_function_growth = growth;
        Ok(())
    }

    pub fn set_rebase_function_lower_percentage(
        &mut self,
        caller: Address,
        lower: i128,
    ) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        if lower > 0 {
            return Err(CinderCoreError::InvalidCurveParameters);
        }
        self.rebase_function_lower_percentage = lower;
        Ok(())
    }

    pub fn set_rebase_function_upper_percentage(
        &mut self,
        caller: Address,
        upper: i128,
    ) -> CoreResult<()> {
        self.ensure_owner(caller)?;
        if upper < 0 {
            return Err(CinderCoreError::InvalidCurveParameters);
        }
        self.rebase_function_upper_percentage = upper;
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> CoreResult<()> {
        if caller != self.owner {
            return Err(CinderCoreError::Unauthorized);
        }
        Ok(())
    }
}

/// Clamp a positive delta so the ledger never exceeds `MAX_SUPPLY`. At or
/// above the ceiling a growth delta becomes exactly zero, never negative.
fn clamp_to_supply_ceiling(supply: u128, delta: i128) -> i128 {
    if delta <= 0 {
        return delta;
    }
    let headroom = MAX_SUPPLY.saturating_sub(supply);
    if (delta as u128) > headroom {
        headroom as i128
    } else {
        delta
    }
}

//! The rebase scheduler: wires the ledger, oracle and policy engine
//! together, keeps the oracle fresh from the configured feed, and drives
//! `rebase()` calls into the recurring window.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::{rngs::StdRng, Rng, SeedableRng};

use cinder_core::constants::ONE_I;
use cinder_core::Address;
use cinder_policy::{OperatorSet, RebasePolicyEngine, RebaseReport, StoredRateOracle};
use cinder_token::SupplyToken;

use crate::config::{FeedConfig, KeeperConfig};
use crate::error::KeeperError;

/// Ledger identity of the deployer (token owner, policy admin)
pub const DEPLOYER: Address = Address::from_low_u64(1);
/// Ledger identity of the policy engine
pub const POLICY_ADDRESS: Address = Address::from_low_u64(2);
/// Ledger identity the keeper calls `rebase()` with
pub const KEEPER_OPERATOR: Address = Address::from_low_u64(3);

/// The wired keeper service
pub struct RebaseKeeper {
    config: KeeperConfig,
    token: SupplyToken,
    engine: RebasePolicyEngine<StoredRateOracle>,
    rng: StdRng,
    current_rate: u128,
}

impl RebaseKeeper {
    /// Wire a fresh deployment from the configuration.
    pub fn new(config: KeeperConfig) -> Result<Self, KeeperError> {
        config.validate()?;

        let mut token = SupplyToken::new(DEPLOYER);
        token.set_monetary_policy(DEPLOYER, POLICY_ADDRESS)?;

        let mut operators = OperatorSet::new(DEPLOYER);
        operators.add_operator(DEPLOYER, KEEPER_OPERATOR)?;

        let policy = &config.policy;
        let mut engine = RebasePolicyEngine::new(
            POLICY_ADDRESS,
            DEPLOYER,
            policy.target_rate as u128,
            operators,
        )?;
        engine.set_deviation_threshold(DEPLOYER, policy.deviation_threshold as u128)?;
        engine.set_rebase_timing_parameters(
            DEPLOYER,
            policy.min_rebase_time_interval_sec,
            policy.rebase_window_offset_sec,
            policy.rebase_window_length_sec,
        )?;
        engine.set_rebase_function_growth(DEPLOYER, policy.rebase_function_growth as i128 * ONE_I)?;
        engine.set_rebase_function_lower_percentage(
            DEPLOYER,
            policy.rebase_function_lower_percentage as i128 * ONE_I,
        )?;
        engine.set_rebase_function_upper_percentage(
            DEPLOYER,
            policy.rebase_function_upper_percentage as i128 * ONE_I,
        )?;
        engine.set_market_oracle(DEPLOYER, StoredRateOracle::new(DEPLOYER))?;

        let current_rate = match config.feed {
            FeedConfig::Fixed { rate } => rate as u128,
            FeedConfig::RandomWalk { start_rate, .. } => start_rate as u128,
        };

        Ok(Self {
            config,
            token,
            engine,
            rng: StdRng::from_entropy(),
            current_rate,
        })
    }

    pub fn engine(&self) -> &RebasePolicyEngine<StoredRateOracle> {
        &self.engine
    }

    pub fn token(&self) -> &SupplyToken {
        &self.token
    }

    pub fn current_rate(&self) -> u128 {
        self.current_rate
    }

    /// Seconds until the next window instant at which a rebase can commit.
    /// Returns 0 when `now` is already such an instant.
    pub fn seconds_until_window(&self, now: u64) -> u64 {
        let interval = self.engine.min_rebase_time_interval_sec();
        let offset = self.engine.rebase_window_offset_sec();
        let last = self.engine.last_rebase_timestamp_sec();

        if self.engine.in_rebase_window(now) && now >= last.saturating_add(interval) {
            return 0;
        }

        let position = now % interval;
        let mut next_open = if position < offset {
            now - position + offset
        } else {
            now - position + offset + interval
        };
        // Skip occurrences still blocked by the once-per-interval gate.
        let earliest = last.saturating_add(interval);
        while next_open < earliest {
            next_open += interval;
        }
        next_open - now
    }

    /// One scheduler step at `now`: refresh the oracle from the feed, then
    /// attempt a rebase. Rejections are logged and absorbed; the next
    /// window is always reachable from here.
    pub fn tick(&mut self, now: u64) -> Option<RebaseReport> {
        self.refresh_feed();

        if self.config.dry_run {
            log::info!(
                "dry run: rate={} in_window={} epoch={}",
                self.current_rate,
                self.engine.in_rebase_window(now),
                self.engine.epoch()
            );
            return None;
        }

        match self.engine.rebase(KEEPER_OPERATOR, now, &mut self.token) {
            Ok(report) => {
                log::info!(
                    "rebase committed: epoch={} rate={} delta={} supply={}",
                    report.epoch,
                    report.exchange_rate,
                    report.supply_delta,
                    self.token.total_supply()
                );
                if let Ok(json) = serde_json::to_string(&report) {
                    log::debug!("rebase report: {}", json);
                }
                Some(report)
            }
            Err(err) => {
                log::warn!("rebase rejected at {}: {}", now, err);
                None
            }
        }
    }

    /// Drive the scheduler forever.
    pub async fn run(&mut self) -> Result<(), KeeperError> {
        let poll = Duration::from_secs(self.config.poll_interval_sec);
        loop {
            let now = unix_now();
            let wait = self.seconds_until_window(now);
            if wait > 0 {
                log::debug!("next rebase window in {}s", wait);
                tokio::time::sleep(poll.min(Duration::from_secs(wait))).await;
                continue;
            }
            self.tick(now);
            tokio::time::sleep(poll).await;
        }
    }

    fn refresh_feed(&mut self) {
        let rate = match self.config.feed {
            FeedConfig::Fixed { rate } => rate as u128,
            FeedConfig::RandomWalk { max_step_bps, .. } => {
                let step: i64 = self
                    .rng
                    .gen_range(-(max_step_bps as i64)..=(max_step_bps as i64));
                let delta = self.current_rate as i128 * step as i128 / 10_000;
                (self.current_rate as i128 + delta).max(1) as u128
            }
        };
        self.current_rate = rate;
        // The keeper owns the oracle through the deployer identity.
        if let Some(oracle) = self.engine.market_oracle_mut() {
            if let Err(err) = oracle.store_rate(DEPLOYER, rate) {
                log::warn!("failed to store oracle rate: {}", err);
            }
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

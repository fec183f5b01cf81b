//! Keeper configuration loaded from a TOML file
//!
//! Rates and thresholds are plain `u64` in 18-decimal units (TOML integers
//! are 64-bit); curve parameters are whole numbers scaled to fixed point
//! when the engine is wired.

use serde::{Deserialize, Serialize};
use std::fs;

use cinder_core::constants::{
    DEFAULT_MIN_REBASE_INTERVAL_SEC, DEFAULT_REBASE_WINDOW_LENGTH_SEC,
    DEFAULT_REBASE_WINDOW_OFFSET_SEC, ONE,
};

use crate::error::KeeperError;

/// Keeper configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeeperConfig {
    /// Seconds between scheduler wakeups while waiting for a window
    pub poll_interval_sec: u64,

    /// Compute and log without committing
    #[serde(default)]
    pub dry_run: bool,

    /// Market rate feed backing the stored-rate oracle
    pub feed: FeedConfig,

    /// Policy parameters applied at startup
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Market feed modes
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FeedConfig {
    /// A constant rate, useful for soak tests
    Fixed { rate: u64 },
    /// A bounded random walk around the starting rate
    RandomWalk { start_rate: u64, max_step_bps: u32 },
}

/// Policy parameters for the wired engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Target exchange rate, 18-decimal units
    pub target_rate: u64,

    /// Deviation threshold, 18-decimal units (0 disables)
    pub deviation_threshold: u64,

    /// Minimum seconds between rebases
    pub min_rebase_time_interval_sec: u64,

    /// Window offset past the interval boundary (seconds)
    pub rebase_window_offset_sec: u64,

    /// Window length (seconds)
    pub rebase_window_length_sec: u64,

    /// Curve growth, whole units
    pub rebase_function_growth: u32,

    /// Curve lower bound, whole percent (<= 0)
    pub rebase_function_lower_percentage: i32,

    /// Curve upper bound, whole percent (>= 0)
    pub rebase_function_upper_percentage: i32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            target_rate: (ONE / 100) as u64,
            deviation_threshold: (ONE / 20) as u64,
            min_rebase_time_interval_sec: DEFAULT_MIN_REBASE_INTERVAL_SEC,
            rebase_window_offset_sec: DEFAULT_REBASE_WINDOW_OFFSET_SEC,
            rebase_window_length_sec: DEFAULT_REBASE_WINDOW_LENGTH_SEC,
            rebase_function_growth: 3,
            rebase_function_lower_percentage: -10,
            rebase_function_upper_percentage: 10,
        }
    }
}

impl KeeperConfig {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> Result<Self, KeeperError> {
        let content = fs::read_to_string(path)
            .map_err(|e| KeeperError::Io(format!("Failed to read config file {}: {}", path, e)))?;
        let config: KeeperConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), KeeperError> {
        if self.poll_interval_sec == 0 {
            return Err(KeeperError::InvalidConfig(
                "poll_interval_sec must be greater than 0".to_string(),
            ));
        }
        self.policy.validate()?;
        match &self.feed {
            FeedConfig::Fixed { rate } if *rate == 0 => Err(KeeperError::InvalidConfig(
                "fixed feed rate must be greater than 0".to_string(),
            )),
            FeedConfig::RandomWalk { start_rate, .. } if *start_rate == 0 => {
                Err(KeeperError::InvalidConfig(
                    "random walk start_rate must be greater than 0".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

impl PolicyConfig {
    fn validate(&self) -> Result<(), KeeperError> {
        if self.target_rate == 0 {
            return Err(KeeperError::InvalidConfig(
                "target_rate must be greater than 0".to_string(),
            ));
        }
        if self.min_rebase_time_interval_sec == 0 {
            return Err(KeeperError::InvalidConfig(
                "min_rebase_time_interval_sec must be greater than 0".to_string(),
            ));
        }
        if self.rebase_window_offset_sec + self.rebase_window_length_sec
            > self.min_rebase_time_interval_sec
        {
            return Err(KeeperError::InvalidConfig(
                "rebase window must fit inside the interval".to_string(),
            ));
        }
        if self.rebase_function_lower_percentage > 0 {
            return Err(KeeperError::InvalidConfig(
                "rebase_function_lower_percentage must be <= 0".to_string(),
            ));
        }
        if self.rebase_function_upper_percentage < 0 {
            return Err(KeeperError::InvalidConfig(
                "rebase_function_upper_percentage must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

//! # Auction Configuration
//!
//! Tunables of the auction, loaded from TOML with environment overrides.
//!
//! ```toml
//! slot_length = 144
//! snap_threshold = 4
//! # token amounts exceed the TOML integer range and are written as strings
//! max_mint = "1000000000000000000000"
//! reward_amount = "1000000000000000000"
//! ```

use crate::domain::{
    TokenAmount, DEFAULT_MAX_MINT, DEFAULT_REWARD_AMOUNT, SLOT_LENGTH, SNAP_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Environment variable overriding `slot_length`.
pub const ENV_SLOT_LENGTH: &str = "RA_SLOT_LENGTH";
/// Environment variable overriding `snap_threshold`.
pub const ENV_SNAP_THRESHOLD: &str = "RA_SNAP_THRESHOLD";
/// Environment variable overriding `max_mint`.
pub const ENV_MAX_MINT: &str = "RA_MAX_MINT";
/// Environment variable overriding `reward_amount`.
pub const ENV_REWARD_AMOUNT: &str = "RA_REWARD_AMOUNT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read {path}: {message}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error
        message: String,
    },

    /// TOML could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Auction configuration.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionConfig {
    /// Blocks per slot.
    pub slot_length: u64,

    /// Ancestor-height gap that lets another caller snap the slot.
    pub snap_threshold: u64,

    /// Cap on the subsidy minted for a single round.
    #[serde_as(as = "DisplayFromStr")]
    pub max_mint: TokenAmount,

    /// Reward paid to each round winner at startup. Adjustable later by the
    /// admin.
    #[serde_as(as = "DisplayFromStr")]
    pub reward_amount: TokenAmount,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            slot_length: SLOT_LENGTH,
            snap_threshold: SNAP_THRESHOLD,
            max_mint: DEFAULT_MAX_MINT,
            reward_amount: DEFAULT_REWARD_AMOUNT,
        }
    }
}

impl AuctionConfig {
    /// Create a config for testing (small token amounts).
    pub fn for_testing() -> Self {
        Self {
            slot_length: SLOT_LENGTH,
            snap_threshold: SNAP_THRESHOLD,
            max_mint: 1_000,
            reward_amount: 10,
        }
    }

    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse TOML content. Missing keys fall back to defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `RA_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        override_value(&lookup, ENV_SLOT_LENGTH, &mut self.slot_length);
        override_value(&lookup, ENV_SNAP_THRESHOLD, &mut self.snap_threshold);
        override_value(&lookup, ENV_MAX_MINT, &mut self.max_mint);
        override_value(&lookup, ENV_REWARD_AMOUNT, &mut self.reward_amount);
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_length == 0 {
            return Err(ConfigError::Invalid {
                field: "slot_length",
                reason: "must be non-zero".into(),
            });
        }
        if self.snap_threshold == 0 || self.snap_threshold >= self.slot_length {
            return Err(ConfigError::Invalid {
                field: "snap_threshold",
                reason: format!("must be in 1..{}", self.slot_length),
            });
        }
        Ok(())
    }
}

fn override_value<T, F>(lookup: &F, key: &str, target: &mut T)
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!(key, value = %raw, "[auction] ignoring unparsable override"),
    }
}

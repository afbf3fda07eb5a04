use core::num::NonZeroU64;
use std::{borrow::Cow, collections::BTreeMap, path::Path};

use anyhow::{Context as _, Result};
use fs_err as fs;
use nonzero_ext::nonzero;
use serde::{de::IgnoredAny, Deserialize, Serialize};
use thiserror::Error;

use crate::phase0::primitives::{Epoch, Gwei};

/// Consensus-layer constants the exit planner depends on.
///
/// The values come from the chain specification and are never computed locally.
/// Keys use the same `SCREAMING_SNAKE_CASE` names as the configuration files published with
/// `consensus-specs`, so a subset of a standard configuration file can be loaded directly.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    // Meta
    pub config_name: Cow<'static, str>,

    // Misc
    #[serde(with = "serde_utils::string_or_native")]
    pub far_future_epoch: Epoch,

    // Time parameters
    #[serde(with = "serde_utils::string_or_native")]
    pub max_seed_lookahead: u64,
    #[serde(with = "serde_utils::string_or_native")]
    pub min_validator_withdrawability_delay: u64,

    // Gwei values
    #[serde(with = "serde_utils::string_or_native")]
    pub max_effective_balance: Gwei,

    // Validator cycle
    #[serde(with = "serde_utils::string_or_native")]
    pub churn_limit_quotient: NonZeroU64,
    #[serde(with = "serde_utils::string_or_native")]
    pub min_per_epoch_churn_limit: u64,

    // Withdrawals processing
    #[serde(with = "serde_utils::string_or_native")]
    pub max_withdrawals_per_payload: NonZeroU64,

    // Standard configuration files contain many more variables than the ones above.
    #[serde(flatten, skip_serializing)]
    pub unknown: BTreeMap<String, IgnoredAny>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Meta
            //
            // Use `default` as the default `config_name` and override it in `Config::mainnet`.
            config_name: Cow::Borrowed("default"),

            // Misc
            far_future_epoch: Epoch::MAX,

            // Time parameters
            max_seed_lookahead: 4,
            min_validator_withdrawability_delay: 256,

            // Gwei values
            max_effective_balance: 32_000_000_000,

            // Validator cycle
            churn_limit_quotient: nonzero!(1_u64 << 16),
            min_per_epoch_churn_limit: 4,

            // Withdrawals processing
            max_withdrawals_per_payload: nonzero!(16_u64),

            unknown: BTreeMap::new(),
        }
    }
}

impl Config {
    /// [Mainnet configuration](https://github.com/eth-clients/mainnet/blob/978f1794eada6f85bee76e4d2d5959a5fb8e0cc5/metadata/config.yaml).
    #[must_use]
    pub fn mainnet() -> Self {
        Self {
            config_name: Cow::Borrowed("mainnet"),
            ..Self::default()
        }
    }

    /// [Minimal configuration](https://github.com/ethereum/consensus-specs/blob/aac851f860fa384916f62027b2dbe3318a354c5b/configs/minimal.yaml).
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            config_name: Cow::Borrowed("minimal"),
            churn_limit_quotient: nonzero!(32_u64),
            min_per_epoch_churn_limit: 2,
            max_withdrawals_per_payload: nonzero!(4_u64),
            ..Self::default()
        }
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        let config = serde_yaml::from_slice::<Self>(&bytes)
            .with_context(|| format!("failed to parse configuration in {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.config_name.is_empty() {
            return Err(Error::NameEmpty);
        }

        // See <https://github.com/ethereum/consensus-specs/blob/aac851f860fa384916f62027b2dbe3318a354c5b/configs/mainnet.yaml#L10>.
        for character in self.config_name.chars() {
            if !matches!(character, 'a'..='z' | '0'..='9' | '-') {
                return Err(Error::NameContainsIllegalCharacters);
            }
        }

        if self.max_effective_balance == 0 {
            return Err(Error::MaxEffectiveBalanceZero);
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration name is empty")]
    NameEmpty,
    #[error("configuration name contains illegal characters")]
    NameContainsIllegalCharacters,
    #[error("MAX_EFFECTIVE_BALANCE must be positive")]
    MaxEffectiveBalanceZero,
}

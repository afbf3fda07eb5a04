use anyhow::Result;
use types::{
    config::Config,
    nonstandard::ChainConfig,
    phase0::primitives::{Epoch, Slot, UnixSeconds},
};

use crate::error::Error;

// > Return the epoch during which validator activations and exits initiated in ``epoch`` take effect.
pub fn compute_activation_exit_epoch(config: &Config, epoch: Epoch) -> Result<Epoch> {
    epoch
        .checked_add(1)
        .and_then(|epoch| epoch.checked_add(config.max_seed_lookahead))
        .ok_or_else(|| Error::EpochOverflow.into())
}

/// Timestamp of the start of `slot`.
///
/// Unlike [`compute_timestamp_at_slot`] in `consensus-specs`, this takes the genesis time from the
/// chain configuration rather than the beacon state.
///
/// [`compute_timestamp_at_slot`]: https://github.com/ethereum/consensus-specs/blob/9839ed49346a85f95af4f8b0cb9c4d98b2308af8/specs/bellatrix/beacon-chain.md#compute_timestamp_at_slot
pub fn compute_timestamp_at_slot(chain_config: ChainConfig, slot: Slot) -> Result<UnixSeconds> {
    slot.checked_mul(chain_config.seconds_per_slot.get())
        .and_then(|seconds| seconds.checked_add(chain_config.genesis_time))
        .ok_or_else(|| Error::TimestampOverflow.into())
}

#[cfg(test)]
mod tests {
    use nonzero_ext::nonzero;

    use super::*;

    const CHAIN_CONFIG: ChainConfig = ChainConfig {
        slots_per_epoch: nonzero!(32_u64),
        seconds_per_slot: nonzero!(12_u64),
        genesis_time: 1_606_824_023,
    };

    #[test]
    fn activation_exit_epoch_adds_seed_lookahead() -> Result<()> {
        assert_eq!(compute_activation_exit_epoch(&Config::mainnet(), 3546)?, 3551);
        Ok(())
    }

    #[test]
    fn activation_exit_epoch_overflow_is_an_error() {
        compute_activation_exit_epoch(&Config::mainnet(), Epoch::MAX - 2)
            .expect_err("epoch should overflow");
    }

    #[test]
    fn timestamp_at_slot_starts_at_genesis() -> Result<()> {
        assert_eq!(compute_timestamp_at_slot(CHAIN_CONFIG, 0)?, 1_606_824_023);
        assert_eq!(compute_timestamp_at_slot(CHAIN_CONFIG, 10)?, 1_606_824_143);
        Ok(())
    }

    #[test]
    fn timestamp_overflow_is_an_error() {
        compute_timestamp_at_slot(CHAIN_CONFIG, Slot::MAX / 2)
            .expect_err("timestamp should overflow");
    }
}

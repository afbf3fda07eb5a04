use std::borrow::Cow;

use anyhow::{ensure, Result};
use helper_functions::misc;
use logging::{debug_in, info_in, Logger};
use types::{
    error::ProtocolError,
    nonstandard::{BlockStamp, ChainConfig},
    phase0::{consts::BASIS_POINTS_DENOMINATOR, primitives::Wei},
    staking::OracleDaemonConfig,
};

use crate::{
    error::Error,
    events::{self, EventSource},
    percentile,
};

/// Estimates protocol rewards per epoch from recent accounting reports.
///
/// Each report distributes consensus-layer withdrawals and execution-layer rewards accumulated
/// over the time elapsed since the previous one. The estimate combines percentiles of both
/// per-second rates, which keeps a single unusually large or small report from skewing it.
pub struct RewardPredictor {
    logger: Logger,
}

impl RewardPredictor {
    #[must_use]
    pub const fn new(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn rewards_per_epoch(
        &self,
        source: &impl EventSource,
        block_stamp: &BlockStamp,
        chain_config: ChainConfig,
        daemon_config: OracleDaemonConfig,
    ) -> Result<Wei> {
        let OracleDaemonConfig {
            prediction_duration_in_slots,
            rewards_percentile_el_bp,
            rewards_percentile_cl_bp,
        } = daemon_config;

        // Blocks are at most one per slot, so this range covers at least the prediction window.
        let to_block = block_stamp.block_number;
        let from_block = to_block.saturating_sub(prediction_duration_in_slots);

        let window_start_slot = block_stamp
            .ref_slot
            .saturating_sub(prediction_duration_in_slots);

        let min_timestamp = misc::compute_timestamp_at_slot(chain_config, window_start_slot)?;

        let distributed = events::group_by_transaction_hash(
            source.eth_distributed_events(from_block, to_block)?,
            min_timestamp,
        )?;

        let rebased = events::group_by_transaction_hash(
            source.token_rebased_events(from_block, to_block)?,
            min_timestamp,
        )?;

        if distributed.is_empty() && rebased.is_empty() {
            debug_in!(
                self.logger,
                "no reports in blocks {from_block}..={to_block}, predicting zero rewards",
            );

            return Ok(0);
        }

        ensure!(
            distributed.keys().eq(rebased.keys()),
            ProtocolError::InconsistentProtocolState {
                details: Cow::Owned(format!(
                    "{} ETHDistributed and {} TokenRebased events in blocks \
                     {from_block}..={to_block} belong to different transactions",
                    distributed.len(),
                    rebased.len(),
                )),
            },
        );

        let speeds = distributed
            .iter()
            .zip(rebased.values())
            .map(|((transaction_hash, distributed), rebased)| -> Result<(Wei, Wei)> {
                ensure!(
                    rebased.time_elapsed > 0,
                    ProtocolError::MalformedData {
                        details: Cow::Owned(format!(
                            "TokenRebased in transaction {transaction_hash:?} has zero elapsed time",
                        )),
                    },
                );

                let time_elapsed = Wei::from(rebased.time_elapsed);

                Ok((
                    distributed.withdrawals_withdrawn / time_elapsed,
                    distributed.execution_layer_rewards_withdrawn / time_elapsed,
                ))
            });

        let (mut cl_speeds, mut el_speeds): (Vec<_>, Vec<_>) =
            itertools::process_results(speeds, |speeds| speeds.unzip())?;

        let cl_speed = percentile::scaled_percentile(&mut cl_speeds, rewards_percentile_cl_bp)?;
        let el_speed = percentile::scaled_percentile(&mut el_speeds, rewards_percentile_el_bp)?;

        let rewards_per_epoch = chain_config
            .seconds_per_epoch()
            .zip(cl_speed.checked_add(el_speed))
            .and_then(|(seconds, speed)| speed.checked_mul(Wei::from(seconds)))
            .map(|rewards| rewards / Wei::from(BASIS_POINTS_DENOMINATOR))
            .ok_or(Error::RewardRateOverflow)?;

        info_in!(
            self.logger,
            "predicted rewards per epoch: {rewards_per_epoch} wei from {} reports",
            distributed.len(),
        );

        Ok(rewards_per_epoch)
    }
}

use core::num::NonZeroU64;

use anyhow::{ensure, Result};
use helper_functions::{accessors, misc};
use types::{config::Config, nonstandard::IndexedValidator, phase0::primitives::Epoch};

use crate::error::Error;

/// Exit queue of the consensus layer as seen at a reference epoch.
///
/// Predictions apply [`initiate_validator_exit`] once per additional exit, assuming nothing else
/// enters the queue in the meantime.
///
/// [`initiate_validator_exit`]: https://github.com/ethereum/consensus-specs/blob/dc17b1e2b6a4ec3a2104c277a33abae75a43b0fa/specs/phase0/beacon-chain.md#initiate_validator_exit
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChurnModel {
    churn_limit: u64,
    latest_exit_epoch: Epoch,
    latest_exit_count: u64,
    activation_exit_epoch: Epoch,
    min_validator_withdrawability_delay: u64,
}

impl ChurnModel {
    pub fn new(config: &Config, validators: &[IndexedValidator], ref_epoch: Epoch) -> Result<Self> {
        let validators = validators.iter().map(|validator| &validator.validator);

        let churn_limit =
            accessors::get_validator_churn_limit(config, validators.clone(), ref_epoch);

        let (latest_exit_epoch, latest_exit_count) =
            accessors::latest_exit_epoch(config, validators);

        let activation_exit_epoch = misc::compute_activation_exit_epoch(config, ref_epoch)?;

        Ok(Self {
            churn_limit,
            latest_exit_epoch,
            latest_exit_count,
            activation_exit_epoch,
            min_validator_withdrawability_delay: config.min_validator_withdrawability_delay,
        })
    }

    #[must_use]
    pub const fn churn_limit(&self) -> u64 {
        self.churn_limit
    }

    #[must_use]
    pub const fn latest_exit_epoch(&self) -> (Epoch, u64) {
        (self.latest_exit_epoch, self.latest_exit_count)
    }

    /// Earliest epoch an exit initiated at the reference epoch can take effect in.
    #[must_use]
    pub const fn activation_exit_epoch(&self) -> Epoch {
        self.activation_exit_epoch
    }

    /// Exit epoch of the validator at 1-based `position` among additional exits.
    pub fn predicted_exit_epoch(&self, position: u64) -> Result<Epoch> {
        ensure!(position > 0, Error::ExitPositionZero);

        let churn_limit = NonZeroU64::new(self.churn_limit).ok_or(Error::ChurnLimitZero)?;

        // > Compute exit queue epoch
        let (queue_epoch, queue_churn) = if self.latest_exit_epoch >= self.activation_exit_epoch {
            (
                self.latest_exit_epoch,
                self.latest_exit_count.min(churn_limit.get()),
            )
        } else {
            (self.activation_exit_epoch, 0)
        };

        // Each full epoch of churn pushes the queue one epoch further.
        let epochs_ahead = queue_churn
            .checked_add(position - 1)
            .ok_or(Error::EpochOverflow)?
            / churn_limit;

        queue_epoch
            .checked_add(epochs_ahead)
            .ok_or_else(|| Error::EpochOverflow.into())
    }

    /// Withdrawable epoch of the validator at 1-based `position` among additional exits.
    pub fn predicted_withdrawable_epoch(&self, position: u64) -> Result<Epoch> {
        self.predicted_exit_epoch(position)?
            .checked_add(self.min_validator_withdrawability_delay)
            .ok_or_else(|| Error::EpochOverflow.into())
    }
}

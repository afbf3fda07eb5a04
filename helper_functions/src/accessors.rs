use core::{cmp::Ordering, ops::Div as _};

use types::{
    config::Config,
    phase0::{consts::GENESIS_EPOCH, containers::Validator, primitives::Epoch},
};

use crate::predicates;

#[must_use]
pub fn active_validator_count<'validators>(
    validators: impl IntoIterator<Item = &'validators Validator>,
    epoch: Epoch,
) -> u64 {
    validators
        .into_iter()
        .filter(|validator| predicates::is_active_validator(validator, epoch))
        .map(|_| 1)
        .sum()
}

#[must_use]
pub fn get_validator_churn_limit<'validators>(
    config: &Config,
    validators: impl IntoIterator<Item = &'validators Validator>,
    epoch: Epoch,
) -> u64 {
    active_validator_count(validators, epoch)
        .div(config.churn_limit_quotient)
        .max(config.min_per_epoch_churn_limit)
}

/// Returns the latest scheduled exit epoch and the number of validators exiting in it.
///
/// Validators that have not initiated an exit are ignored.
/// Returns `(GENESIS_EPOCH, 0)` if no validator has initiated an exit.
#[must_use]
pub fn latest_exit_epoch<'validators>(
    config: &Config,
    validators: impl IntoIterator<Item = &'validators Validator>,
) -> (Epoch, u64) {
    let mut latest_epoch = GENESIS_EPOCH;
    let mut latest_count = 0;

    for validator in validators {
        let exit_epoch = validator.exit_epoch;

        if exit_epoch == config.far_future_epoch {
            continue;
        }

        match exit_epoch.cmp(&latest_epoch) {
            Ordering::Less => {}
            Ordering::Equal => latest_count += 1,
            Ordering::Greater => {
                latest_epoch = exit_epoch;
                latest_count = 1;
            }
        }
    }

    (latest_epoch, latest_count)
}

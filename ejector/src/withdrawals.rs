use helper_functions::predicates;
use itertools::Itertools as _;
use types::{
    config::Config,
    nonstandard::{ChainConfig, GweiExt as _, IndexedValidator},
    phase0::primitives::{Epoch, Wei},
    staking::StakedValidator,
};

/// Number of epochs the withdrawal sweep needs to go through validators withdrawable at `epoch`.
#[must_use]
pub fn sweep_delay_in_epochs(
    config: &Config,
    chain_config: ChainConfig,
    validators: &[IndexedValidator],
    epoch: Epoch,
) -> u64 {
    let withdrawable_count = validators
        .iter()
        .filter(|indexed| {
            let IndexedValidator {
                balance, validator, ..
            } = indexed;

            predicates::is_fully_withdrawable_validator(validator, *balance, epoch)
                || predicates::is_partially_withdrawable_validator(config, validator, *balance)
        })
        .map(|_| 1)
        .sum::<u64>();

    let withdrawals_per_epoch = config
        .max_withdrawals_per_payload
        .get()
        .saturating_mul(chain_config.slots_per_epoch.get());

    withdrawable_count.div_ceil(withdrawals_per_epoch)
}

/// Balances of protocol validators that have already initiated exits, by withdrawable epoch.
pub struct PendingWithdrawals {
    withdrawable_epochs: Vec<Epoch>,
    cumulative_balances: Vec<Wei>,
}

impl PendingWithdrawals {
    #[must_use]
    pub fn new(config: &Config, staked_validators: &[StakedValidator]) -> Self {
        let (withdrawable_epochs, balances): (Vec<_>, Vec<_>) = staked_validators
            .iter()
            .map(|staked| &staked.validator)
            .filter(|indexed| {
                predicates::is_exit_initiated(config, &indexed.validator)
                    && predicates::has_eth1_withdrawal_credential(&indexed.validator)
                    && indexed.balance > 0
            })
            .map(|indexed| (indexed.validator.withdrawable_epoch, indexed.balance.to_wei()))
            .sorted_unstable()
            .unzip();

        let cumulative_balances = balances
            .into_iter()
            .scan(0, |total: &mut Wei, balance| {
                *total = total.saturating_add(balance);
                Some(*total)
            })
            .collect();

        Self {
            withdrawable_epochs,
            cumulative_balances,
        }
    }

    /// Total balance of exiting validators that become fully withdrawable by `epoch`.
    #[must_use]
    pub fn withdrawable_by(&self, epoch: Epoch) -> Wei {
        self.withdrawable_epochs
            .partition_point(|withdrawable_epoch| *withdrawable_epoch <= epoch)
            .checked_sub(1)
            .and_then(|last| self.cumulative_balances.get(last))
            .copied()
            .unwrap_or_default()
    }
}

use std::sync::Arc;

use anyhow::Result;
use helper_functions::predicates;
use logging::{debug_in, info_in, Logger};
use oracle_consensus::{Report, ReportCache, ReportModule};
use reward_prediction::RewardPredictor;
use types::{
    config::Config,
    nonstandard::{BlockStamp, GweiExt as _},
    phase0::primitives::Wei,
    staking::{ProcessingState, StakedValidator},
};

use crate::{
    churn::ChurnModel,
    exit_order::ExitCandidates,
    exit_requests::{self, DATA_FORMAT_EMPTY, DATA_FORMAT_LIST},
    sources::Sources,
    staked_validators,
    withdrawals::{self, PendingWithdrawals},
};

pub const CONSENSUS_VERSION: u64 = 1;

/// Report module that requests protocol validators to exit when buffered ether and expected
/// rewards are not enough to finalize pending withdrawal requests.
pub struct Ejector<S> {
    config: Arc<Config>,
    sources: S,
    reward_predictor: RewardPredictor,
    report_cache: ReportCache,
    logger: Logger,
}

impl<S: Sources> Ejector<S> {
    #[must_use]
    pub fn new(config: Arc<Config>, sources: S, logger: Logger) -> Self {
        let reward_predictor = RewardPredictor::new(logger.child("reward_prediction"));

        Self {
            config,
            sources,
            reward_predictor,
            report_cache: ReportCache::default(),
            logger,
        }
    }

    #[must_use]
    pub const fn sources(&self) -> &S {
        &self.sources
    }

    pub fn total_unfinalized_withdrawal_demand(&self, block_stamp: &BlockStamp) -> Result<Wei> {
        let demand = self.sources.unfinalized_withdrawal_demand(block_stamp)?;
        debug_in!(self.logger, "unfinalized withdrawal demand: {demand} wei");
        Ok(demand)
    }

    pub fn sweep_delay_in_epochs(&self, block_stamp: &BlockStamp) -> Result<u64> {
        let chain_config = self.sources.chain_config(block_stamp)?;
        let validators = self.sources.validators(block_stamp)?;

        Ok(withdrawals::sweep_delay_in_epochs(
            &self.config,
            chain_config,
            &validators,
            block_stamp.ref_epoch,
        ))
    }

    /// Selects validators to request exits for, in the order they should exit.
    ///
    /// Validators are added until the ether expected by the time the last one is withdrawn
    /// covers the unfinalized withdrawal demand.
    pub fn validators_to_eject(&self, block_stamp: &BlockStamp) -> Result<Vec<StakedValidator>> {
        let config = &self.config;
        let sources = &self.sources;
        let ref_epoch = block_stamp.ref_epoch;

        let max_validators_to_exit = sources
            .exit_request_limits(block_stamp)?
            .max_validators_to_exit;

        if max_validators_to_exit == 0 {
            info_in!(self.logger, "exit requests are paused");
            return Ok(vec![]);
        }

        let demand = self.total_unfinalized_withdrawal_demand(block_stamp)?;

        if demand == 0 {
            info_in!(self.logger, "no unfinalized withdrawal requests");
            return Ok(vec![]);
        }

        let chain_config = sources.chain_config(block_stamp)?;
        let daemon_config = sources.oracle_daemon_config(block_stamp)?;

        let rewards_per_epoch = self.reward_predictor.rewards_per_epoch(
            sources,
            block_stamp,
            chain_config,
            daemon_config,
        )?;

        // Fetched once and shared by everything below.
        let validators = sources.validators(block_stamp)?;

        let sweep_delay =
            withdrawals::sweep_delay_in_epochs(config, chain_config, &validators, ref_epoch);

        let churn = ChurnModel::new(config, &validators, ref_epoch)?;

        let used_keys = sources.used_keys(block_stamp)?;

        staked_validators::ensure_registry_is_complete(
            &used_keys,
            sources.total_deposited_validators(block_stamp)?,
        )?;

        let staked_validators = staked_validators::join_staked_validators(validators, &used_keys);

        let last_requested_indices = sources.last_requested_validator_indices(block_stamp)?;

        let available_balance = sources
            .withdrawal_vault_balance(block_stamp)?
            .saturating_add(sources.execution_layer_vault_balance(block_stamp)?)
            .saturating_sub(sources.reserved_buffer(block_stamp)?);

        // Validators requested to exit in earlier reports that have not initiated exits yet.
        // They enter the exit queue ahead of the ones selected here.
        let (in_flight_count, in_flight_balance) = staked_validators
            .iter()
            .filter(|staked| {
                last_requested_indices
                    .get(&staked.operator)
                    .is_some_and(|last_requested| staked.validator.index <= *last_requested)
                    && !predicates::is_exit_initiated(config, &staked.validator.validator)
            })
            .fold((0_u64, Wei::default()), |(count, balance), staked| {
                (count + 1, balance.saturating_add(self.exit_balance(staked)))
            });

        let pending_withdrawals = PendingWithdrawals::new(config, &staked_validators);

        info_in!(
            self.logger,
            "demand: {demand} wei, available: {available_balance} wei, \
             rewards per epoch: {rewards_per_epoch} wei, sweep delay: {sweep_delay} epochs, \
             churn limit: {}, requested but not exiting: {in_flight_count}",
            churn.churn_limit(),
        );

        let candidates = ExitCandidates::new(
            config,
            &staked_validators,
            &last_requested_indices,
            ref_epoch,
            max_validators_to_exit,
        );

        let mut selected = vec![];
        let mut selected_balance: Wei = 0;

        for candidate in candidates {
            let position = in_flight_count.saturating_add(selected.len() as u64) + 1;
            let withdrawable_epoch = churn.predicted_withdrawable_epoch(position)?;

            let epochs_until_withdrawn = withdrawable_epoch
                .saturating_add(sweep_delay)
                .saturating_sub(ref_epoch);

            let rewards = rewards_per_epoch.saturating_mul(Wei::from(epochs_until_withdrawn));

            let expected_balance = available_balance
                .saturating_add(in_flight_balance)
                .saturating_add(selected_balance)
                .saturating_add(rewards)
                .saturating_add(pending_withdrawals.withdrawable_by(withdrawable_epoch));

            if expected_balance >= demand {
                break;
            }

            selected_balance = selected_balance.saturating_add(self.exit_balance(candidate));
            selected.push(candidate.clone());
        }

        info_in!(
            self.logger,
            "selected {} validators to exit (ether freed: {selected_balance} wei)",
            selected.len(),
        );

        Ok(selected)
    }

    fn compute_report(&self, block_stamp: &BlockStamp) -> Result<Report> {
        let validators = self.validators_to_eject(block_stamp)?;

        let (data_format, data) = if validators.is_empty() {
            (DATA_FORMAT_EMPTY, vec![])
        } else {
            (
                DATA_FORMAT_LIST,
                exit_requests::encode_exit_requests(&validators)?,
            )
        };

        Ok(Report {
            consensus_version: CONSENSUS_VERSION,
            ref_slot: block_stamp.ref_slot,
            requests_count: validators.len() as u64,
            data_format,
            data,
        })
    }

    // Balance above the maximum effective balance is swept before the exit.
    fn exit_balance(&self, staked: &StakedValidator) -> Wei {
        staked
            .validator
            .validator
            .effective_balance
            .min(self.config.max_effective_balance)
            .to_wei()
    }
}

impl<S: Sources> ReportModule for Ejector<S> {
    fn consensus_version(&self) -> u64 {
        CONSENSUS_VERSION
    }

    fn processing_state(&self, block_stamp: &BlockStamp) -> Result<ProcessingState> {
        self.sources.processing_state(block_stamp)
    }

    fn build_report(&self, block_stamp: &BlockStamp) -> Result<Report> {
        let report = self
            .report_cache
            .get_or_try_build(block_stamp, || self.compute_report(block_stamp))?;

        Ok(Report::clone(&report))
    }
}

use std::collections::BTreeMap;

use anyhow::Result;
use reward_prediction::EventSource;
use types::{
    nonstandard::{BlockStamp, ChainConfig, IndexedValidator},
    phase0::primitives::{ValidatorIndex, Wei},
    staking::{ExitRequestLimits, OperatorKey, OracleDaemonConfig, ProcessingState, RegistryKey},
};

pub trait ConsensusLayer {
    fn validators(&self, block_stamp: &BlockStamp) -> Result<Vec<IndexedValidator>>;
}

pub trait StakingRegistry {
    /// Keys of all staking modules that have been used for deposits.
    fn used_keys(&self, block_stamp: &BlockStamp) -> Result<Vec<RegistryKey>>;

    /// Number of validators deposited through all staking modules, as tracked by the staking
    /// router.
    fn total_deposited_validators(&self, block_stamp: &BlockStamp) -> Result<u64>;
}

/// Contract state of the staking protocol at a reference point.
pub trait ProtocolState {
    /// Amount of unfinalized withdrawal requests.
    fn unfinalized_withdrawal_demand(&self, block_stamp: &BlockStamp) -> Result<Wei>;

    fn withdrawal_vault_balance(&self, block_stamp: &BlockStamp) -> Result<Wei>;

    fn execution_layer_vault_balance(&self, block_stamp: &BlockStamp) -> Result<Wei>;

    /// Part of the buffered ether that cannot be used to finalize withdrawal requests.
    fn reserved_buffer(&self, block_stamp: &BlockStamp) -> Result<Wei>;

    fn exit_request_limits(&self, block_stamp: &BlockStamp) -> Result<ExitRequestLimits>;

    /// Index of the last validator requested to exit for each operator.
    ///
    /// Operators with no requests so far are absent from the map.
    fn last_requested_validator_indices(
        &self,
        block_stamp: &BlockStamp,
    ) -> Result<BTreeMap<OperatorKey, ValidatorIndex>>;

    fn oracle_daemon_config(&self, block_stamp: &BlockStamp) -> Result<OracleDaemonConfig>;

    fn chain_config(&self, block_stamp: &BlockStamp) -> Result<ChainConfig>;

    fn processing_state(&self, block_stamp: &BlockStamp) -> Result<ProcessingState>;
}

pub trait Sources: ConsensusLayer + StakingRegistry + ProtocolState + EventSource {}

impl<S: ConsensusLayer + StakingRegistry + ProtocolState + EventSource> Sources for S {}

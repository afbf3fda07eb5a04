//! Records of the liquid-staking protocol read at a reference point.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{
    nonstandard::IndexedValidator,
    phase0::primitives::{BasisPoints, PublicKeyBytes, Slot, UnixSeconds, H256},
};

pub type NodeOperatorId = u64;
pub type StakingModuleId = u64;

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Debug,
    Display,
    Deserialize,
    Serialize,
)]
#[display("{module_id}/{operator_id}")]
pub struct OperatorKey {
    pub module_id: StakingModuleId,
    pub operator_id: NodeOperatorId,
}

/// A signing key registered by a node operator in one of the staking modules.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct RegistryKey {
    pub pubkey: PublicKeyBytes,
    pub operator: OperatorKey,
}

/// A consensus-layer validator owned by the protocol.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StakedValidator {
    pub operator: OperatorKey,
    pub validator: IndexedValidator,
}

/// Parameters the daemon reads from the on-chain oracle configuration.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct OracleDaemonConfig {
    #[serde(with = "serde_utils::string_or_native")]
    pub prediction_duration_in_slots: u64,
    #[serde(with = "serde_utils::string_or_native")]
    pub rewards_percentile_el_bp: BasisPoints,
    #[serde(with = "serde_utils::string_or_native")]
    pub rewards_percentile_cl_bp: BasisPoints,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
pub struct ExitRequestLimits {
    /// Zero means exit requests are paused.
    #[serde(with = "serde_utils::string_or_native")]
    pub max_validators_to_exit: u64,
}

/// Report processing state of the current frame as seen by the report contract.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
pub struct ProcessingState {
    #[serde(with = "serde_utils::string_or_native")]
    pub current_frame_ref_slot: Slot,
    #[serde(with = "serde_utils::string_or_native")]
    pub processing_deadline_time: UnixSeconds,
    pub data_hash: H256,
    pub data_submitted: bool,
    #[serde(with = "serde_utils::string_or_native")]
    pub data_format: u64,
    #[serde(with = "serde_utils::string_or_native")]
    pub requests_count: u64,
    #[serde(with = "serde_utils::string_or_native")]
    pub requests_submitted: u64,
}

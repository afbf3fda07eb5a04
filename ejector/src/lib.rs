pub use crate::{
    churn::ChurnModel,
    ejector::{Ejector, CONSENSUS_VERSION},
    exit_order::ExitCandidates,
    exit_requests::{encode_exit_requests, DATA_FORMAT_EMPTY, DATA_FORMAT_LIST},
    sources::{ConsensusLayer, ProtocolState, Sources, StakingRegistry},
    staked_validators::join_staked_validators,
};

mod churn;
mod ejector;
mod error;
mod exit_order;
mod exit_requests;
mod sources;
mod staked_validators;
mod withdrawals;

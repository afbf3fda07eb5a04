pub use crate::{
    events::{EthDistributed, EventLog, EventSource, TokenRebased},
    percentile::percentile,
    reward_predictor::RewardPredictor,
};

mod error;
mod events;
mod percentile;
mod reward_predictor;

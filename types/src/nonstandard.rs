use core::num::NonZeroU64;

use derive_more::Display;
use easy_ext::ext;
use serde::{Deserialize, Serialize};

use crate::phase0::{
    consts::WEI_IN_GWEI,
    containers::Validator,
    primitives::{
        Epoch, ExecutionBlockNumber, Gwei, Slot, UnixSeconds, ValidatorIndex, Wei, H256,
    },
};

/// Immutable pointer to the block that pins every query made for one reporting frame.
///
/// `ref_slot` is the reference slot of the frame. `slot` is the slot of the block actually used,
/// which is earlier than `ref_slot` when the reference slot was missed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, Deserialize, Serialize)]
#[display("ref slot {ref_slot} (slot {slot}, block {block_number} {block_hash:?})")]
pub struct BlockStamp {
    pub ref_slot: Slot,
    pub ref_epoch: Epoch,
    pub slot: Slot,
    pub block_number: ExecutionBlockNumber,
    pub block_hash: H256,
    pub state_root: H256,
}

/// Chain timing as recorded in the consensus contract.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct ChainConfig {
    #[serde(with = "serde_utils::string_or_native")]
    pub slots_per_epoch: NonZeroU64,
    #[serde(with = "serde_utils::string_or_native")]
    pub seconds_per_slot: NonZeroU64,
    #[serde(with = "serde_utils::string_or_native")]
    pub genesis_time: UnixSeconds,
}

impl ChainConfig {
    /// Returns `None` if the values read from the consensus contract do not fit in `u64`.
    #[must_use]
    pub const fn seconds_per_epoch(self) -> Option<u64> {
        self.slots_per_epoch
            .get()
            .checked_mul(self.seconds_per_slot.get())
    }
}

/// A validator as returned by the Eth Beacon Node API, together with its index and balance.
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
pub struct IndexedValidator {
    #[serde(with = "serde_utils::string_or_native")]
    pub index: ValidatorIndex,
    #[serde(with = "serde_utils::string_or_native")]
    pub balance: Gwei,
    pub validator: Validator,
}

#[ext(GweiExt)]
pub impl Gwei {
    #[must_use]
    fn to_wei(self) -> Wei {
        Wei::from(self) * WEI_IN_GWEI
    }
}

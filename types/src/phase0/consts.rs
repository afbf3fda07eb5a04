use hex_literal::hex;

use crate::phase0::primitives::{BasisPoints, Epoch, Wei};

pub const BASIS_POINTS_DENOMINATOR: BasisPoints = 10_000;
pub const ETH1_ADDRESS_WITHDRAWAL_PREFIX: &[u8] = &hex!("01");
pub const GENESIS_EPOCH: Epoch = 0;
pub const WEI_IN_GWEI: Wei = 1_000_000_000;

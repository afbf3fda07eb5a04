use anyhow::{ensure, Result};
use itertools::Itertools as _;
use types::{
    phase0::primitives::PUBLIC_KEY_SIZE,
    staking::{NodeOperatorId, StakedValidator, StakingModuleId},
};

use crate::error::Error;

/// Data format of a report with no exit requests.
pub const DATA_FORMAT_EMPTY: u64 = 0;

/// Data format of a report with a list of packed exit requests.
pub const DATA_FORMAT_LIST: u64 = 1;

const MODULE_ID_SIZE: usize = 3;
const OPERATOR_ID_SIZE: usize = 5;
const VALIDATOR_INDEX_SIZE: usize = 8;
const REQUEST_SIZE: usize = MODULE_ID_SIZE + OPERATOR_ID_SIZE + VALIDATOR_INDEX_SIZE + PUBLIC_KEY_SIZE;

const MAX_MODULE_ID: StakingModuleId = (1 << (MODULE_ID_SIZE * 8)) - 1;
const MAX_OPERATOR_ID: NodeOperatorId = (1 << (OPERATOR_ID_SIZE * 8)) - 1;

/// Packs exit requests in [`DATA_FORMAT_LIST`].
///
/// Each request takes 64 bytes:
/// ```text
/// | module ID | operator ID | validator index | public key |
/// |  3 bytes  |   5 bytes   |     8 bytes     |  48 bytes  |
/// ```
/// Integers are big-endian. Requests are sorted by module ID, operator ID and validator index.
pub fn encode_exit_requests<'validators>(
    validators: impl IntoIterator<Item = &'validators StakedValidator>,
) -> Result<Vec<u8>> {
    let validators = validators
        .into_iter()
        .sorted_by_key(|staked| (staked.operator, staked.validator.index))
        .collect_vec();

    let mut bytes = Vec::with_capacity(validators.len() * REQUEST_SIZE);

    for staked in validators {
        let StakedValidator {
            operator,
            validator,
        } = staked;

        let module_id = operator.module_id;
        let operator_id = operator.operator_id;

        ensure!(module_id <= MAX_MODULE_ID, Error::ModuleIdOverflow { module_id });
        ensure!(operator_id <= MAX_OPERATOR_ID, Error::OperatorIdOverflow { operator_id });

        bytes.extend_from_slice(&module_id.to_be_bytes()[size_of::<u64>() - MODULE_ID_SIZE..]);
        bytes.extend_from_slice(&operator_id.to_be_bytes()[size_of::<u64>() - OPERATOR_ID_SIZE..]);
        bytes.extend_from_slice(&validator.index.to_be_bytes());
        bytes.extend_from_slice(validator.validator.pubkey.as_bytes());
    }

    Ok(bytes)
}

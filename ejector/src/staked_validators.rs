use std::{borrow::Cow, collections::HashMap};

use anyhow::{ensure, Result};
use types::{
    error::ProtocolError,
    nonstandard::IndexedValidator,
    staking::{RegistryKey, StakedValidator},
};

/// Fails if the registry lists fewer used keys than there are deposited validators.
///
/// Validators whose keys are missing could not be attributed to the protocol.
pub(crate) fn ensure_registry_is_complete(
    keys: &[RegistryKey],
    total_deposited_validators: u64,
) -> Result<()> {
    let key_count = u64::try_from(keys.len())?;

    ensure!(
        key_count >= total_deposited_validators,
        ProtocolError::InconsistentProtocolState {
            details: Cow::Owned(format!(
                "registry lists {key_count} used keys \
                 but {total_deposited_validators} validators have been deposited",
            )),
        },
    );

    Ok(())
}

/// Pairs validators with the node operators whose registry keys they use.
///
/// Validators not matching any key do not belong to the protocol and are dropped.
/// Keys without a validator have not been deposited yet. The order of `validators` is preserved.
#[must_use]
pub fn join_staked_validators(
    validators: Vec<IndexedValidator>,
    keys: &[RegistryKey],
) -> Vec<StakedValidator> {
    let operators = keys
        .iter()
        .map(|key| (key.pubkey, key.operator))
        .collect::<HashMap<_, _>>();

    validators
        .into_iter()
        .filter_map(|validator| {
            let operator = *operators.get(&validator.validator.pubkey)?;
            Some(StakedValidator {
                operator,
                validator,
            })
        })
        .collect()
}

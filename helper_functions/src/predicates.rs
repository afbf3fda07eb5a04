use types::{
    config::Config,
    phase0::{
        consts::ETH1_ADDRESS_WITHDRAWAL_PREFIX,
        containers::Validator,
        primitives::{Epoch, Gwei},
    },
};

// > Check if ``validator`` is active.
#[inline]
#[must_use]
pub const fn is_active_validator(validator: &Validator, epoch: Epoch) -> bool {
    validator.activation_epoch <= epoch && epoch < validator.exit_epoch
}

/// Whether an exit has already been initiated for `validator`, either voluntarily or by slashing.
#[inline]
#[must_use]
pub const fn is_exit_initiated(config: &Config, validator: &Validator) -> bool {
    validator.exit_epoch != config.far_future_epoch
}

/// Whether `validator` may still be asked to exit at `epoch`.
#[must_use]
pub const fn is_exitable_validator(config: &Config, validator: &Validator, epoch: Epoch) -> bool {
    is_active_validator(validator, epoch)
        && !is_exit_initiated(config, validator)
        && !validator.slashed
}

/// [`has_eth1_withdrawal_credential`](https://github.com/ethereum/consensus-specs/blob/dc17b1e2b6a4ec3a2104c277a33abae75a43b0fa/specs/capella/beacon-chain.md#has_eth1_withdrawal_credential)
///
/// > Check if ``validator`` has an 0x01 prefixed "eth1" withdrawal credential.
#[must_use]
pub fn has_eth1_withdrawal_credential(validator: &Validator) -> bool {
    validator
        .withdrawal_credentials
        .as_bytes()
        .starts_with(ETH1_ADDRESS_WITHDRAWAL_PREFIX)
}

/// [`is_fully_withdrawable_validator`](https://github.com/ethereum/consensus-specs/blob/dc17b1e2b6a4ec3a2104c277a33abae75a43b0fa/specs/capella/beacon-chain.md#is_fully_withdrawable_validator)
///
/// > Check if ``validator`` is fully withdrawable.
#[must_use]
pub fn is_fully_withdrawable_validator(validator: &Validator, balance: Gwei, epoch: Epoch) -> bool {
    has_eth1_withdrawal_credential(validator)
        && validator.withdrawable_epoch <= epoch
        && balance > 0
}

/// [`is_partially_withdrawable_validator`](https://github.com/ethereum/consensus-specs/blob/dc17b1e2b6a4ec3a2104c277a33abae75a43b0fa/specs/capella/beacon-chain.md#is_partially_withdrawable_validator)
///
/// > Check if ``validator`` is partially withdrawable.
#[must_use]
pub fn is_partially_withdrawable_validator(
    config: &Config,
    validator: &Validator,
    balance: Gwei,
) -> bool {
    let has_max_effective_balance = validator.effective_balance == config.max_effective_balance;
    let has_excess_balance = balance > config.max_effective_balance;
    has_eth1_withdrawal_credential(validator) && has_max_effective_balance && has_excess_balance
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use test_case::test_case;
    use types::phase0::primitives::H256;

    use super::*;

    const ETH1_CREDENTIALS: H256 = H256(hex!(
        "010000000000000000000000b9d7934878b5fb9610b3fe8a5e441e8fad7e293f"
    ));

    const BLS_CREDENTIALS: H256 = H256(hex!(
        "00f50428677c60f997aadeab24aabf7fceaef491c96a52b463ae91f95611cf71"
    ));

    fn validator(withdrawal_credentials: H256, withdrawable_epoch: Epoch) -> Validator {
        Validator {
            withdrawal_credentials,
            effective_balance: 32_000_000_000,
            activation_epoch: 10,
            exit_epoch: Epoch::MAX,
            withdrawable_epoch,
            ..Validator::default()
        }
    }

    #[test_case(9 => false; "before activation")]
    #[test_case(10 => true; "at activation")]
    #[test_case(19 => true; "before exit")]
    #[test_case(20 => false; "at exit")]
    fn validator_activity(epoch: Epoch) -> bool {
        let validator = Validator {
            activation_epoch: 10,
            exit_epoch: 20,
            ..Validator::default()
        };

        is_active_validator(&validator, epoch)
    }

    #[test]
    fn slashed_and_exiting_validators_are_not_exitable() {
        let config = Config::mainnet();
        let healthy = validator(ETH1_CREDENTIALS, Epoch::MAX);

        let slashed = Validator {
            slashed: true,
            ..healthy.clone()
        };

        let exiting = Validator {
            exit_epoch: 300,
            ..healthy.clone()
        };

        assert!(is_exitable_validator(&config, &healthy, 100));
        assert!(!is_exitable_validator(&config, &slashed, 100));
        assert!(!is_exitable_validator(&config, &exiting, 100));
        assert!(!is_exitable_validator(&config, &healthy, 5));
    }

    #[test_case(ETH1_CREDENTIALS, 100, 32_000_000_000, 100 => true; "withdrawable now")]
    #[test_case(ETH1_CREDENTIALS, 101, 32_000_000_000, 100 => false; "withdrawable later")]
    #[test_case(ETH1_CREDENTIALS, 100, 0, 100 => false; "already swept")]
    #[test_case(BLS_CREDENTIALS, 100, 32_000_000_000, 100 => false; "bls credentials")]
    fn full_withdrawability(
        credentials: H256,
        withdrawable_epoch: Epoch,
        balance: Gwei,
        epoch: Epoch,
    ) -> bool {
        is_fully_withdrawable_validator(&validator(credentials, withdrawable_epoch), balance, epoch)
    }

    #[test_case(ETH1_CREDENTIALS, 32_000_000_001 => true; "excess balance")]
    #[test_case(ETH1_CREDENTIALS, 32_000_000_000 => false; "no excess balance")]
    #[test_case(BLS_CREDENTIALS, 33_000_000_000 => false; "bls credentials")]
    fn partial_withdrawability(credentials: H256, balance: Gwei) -> bool {
        let config = Config::mainnet();
        is_partially_withdrawable_validator(&config, &validator(credentials, Epoch::MAX), balance)
    }
}

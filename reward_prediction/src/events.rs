use std::{borrow::Cow, collections::BTreeMap};

use anyhow::{ensure, Result};
use serde::Deserialize;
use types::{
    error::ProtocolError,
    phase0::primitives::{ExecutionBlockNumber, UnixSeconds, Wei, H256},
};

/// A decoded contract event together with the log metadata needed to pair events.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EventLog<T> {
    pub transaction_hash: Option<H256>,
    pub block_number: ExecutionBlockNumber,
    pub removed: bool,
    pub args: T,
}

/// Emitted by the staking pool when an accounting report distributes rewards.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthDistributed {
    #[serde(with = "serde_utils::string_or_native")]
    pub report_timestamp: UnixSeconds,
    #[serde(with = "serde_utils::string_or_native")]
    pub withdrawals_withdrawn: Wei,
    #[serde(with = "serde_utils::string_or_native")]
    pub execution_layer_rewards_withdrawn: Wei,
}

/// Emitted by the staking pool in the same transaction as [`EthDistributed`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRebased {
    #[serde(with = "serde_utils::string_or_native")]
    pub report_timestamp: UnixSeconds,
    #[serde(with = "serde_utils::string_or_native")]
    pub time_elapsed: u64,
}

pub trait ReportTimestamp {
    fn report_timestamp(&self) -> UnixSeconds;
}

impl ReportTimestamp for EthDistributed {
    fn report_timestamp(&self) -> UnixSeconds {
        self.report_timestamp
    }
}

impl ReportTimestamp for TokenRebased {
    fn report_timestamp(&self) -> UnixSeconds {
        self.report_timestamp
    }
}

/// Read-only access to historical staking pool events.
///
/// Both block bounds are inclusive.
pub trait EventSource {
    fn eth_distributed_events(
        &self,
        from_block: ExecutionBlockNumber,
        to_block: ExecutionBlockNumber,
    ) -> Result<Vec<EventLog<EthDistributed>>>;

    fn token_rebased_events(
        &self,
        from_block: ExecutionBlockNumber,
        to_block: ExecutionBlockNumber,
    ) -> Result<Vec<EventLog<TokenRebased>>>;
}

/// Keys events by transaction hash, keeping only those reported at or after `min_timestamp`.
///
/// A later event with the same transaction hash replaces an earlier one.
pub(crate) fn group_by_transaction_hash<T: ReportTimestamp>(
    logs: Vec<EventLog<T>>,
    min_timestamp: UnixSeconds,
) -> Result<BTreeMap<H256, T>> {
    let mut grouped = BTreeMap::new();

    for log in logs {
        let EventLog {
            transaction_hash,
            block_number,
            removed,
            args,
        } = log;

        ensure!(
            !removed,
            ProtocolError::MalformedData {
                details: Cow::Owned(format!("log in block {block_number} was removed by a reorg")),
            },
        );

        let Some(transaction_hash) = transaction_hash else {
            return Err(ProtocolError::MalformedData {
                details: Cow::Owned(format!("log in block {block_number} has no transaction hash")),
            }
            .into());
        };

        if args.report_timestamp() >= min_timestamp {
            grouped.insert(transaction_hash, args);
        }
    }

    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rebased(transaction_hash: Option<H256>, report_timestamp: UnixSeconds) -> EventLog<TokenRebased> {
        EventLog {
            transaction_hash,
            block_number: 100,
            removed: false,
            args: TokenRebased {
                report_timestamp,
                time_elapsed: 384,
            },
        }
    }

    #[test]
    fn events_before_bound_are_dropped_and_later_duplicates_win() -> Result<()> {
        let first = H256::repeat_byte(1);
        let second = H256::repeat_byte(2);

        let mut duplicate = rebased(Some(first), 2000);
        duplicate.args.time_elapsed = 768;

        let grouped = group_by_transaction_hash(
            vec![
                rebased(Some(first), 1000),
                rebased(Some(second), 999),
                duplicate,
            ],
            1000,
        )?;

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[&first].time_elapsed, 768);

        Ok(())
    }

    #[test]
    fn log_without_transaction_hash_is_malformed() {
        let error = group_by_transaction_hash(vec![rebased(None, 1000)], 0)
            .expect_err("log without transaction hash should be rejected");

        assert!(ProtocolError::is_in_chain_of(&error));
    }

    #[test]
    fn removed_log_is_malformed() {
        let mut log = rebased(Some(H256::zero()), 1000);
        log.removed = true;

        let error = group_by_transaction_hash(vec![log], 0)
            .expect_err("removed log should be rejected");

        assert!(ProtocolError::is_in_chain_of(&error));
    }

    #[test]
    fn event_arguments_are_deserialized_from_contract_output() -> Result<()> {
        let distributed = serde_json::from_value::<EthDistributed>(json!({
            "reportTimestamp": 1_700_000_000,
            "withdrawalsWithdrawn": "1000000000000000000000",
            "executionLayerRewardsWithdrawn": 7,
        }))?;

        assert_eq!(distributed.withdrawals_withdrawn, 1_000_000_000_000_000_000_000);
        assert_eq!(distributed.execution_layer_rewards_withdrawn, 7);

        Ok(())
    }
}

use anyhow::Result;
use types::{
    nonstandard::BlockStamp,
    phase0::primitives::H256,
    staking::ProcessingState,
};

use crate::report::Report;

/// Tells which frame is currently open for reporting.
pub trait FrameClockPort {
    /// Returns `None` until the reference slot of the current frame is finalized.
    fn reference_block_stamp(&self) -> Result<Option<BlockStamp>>;
}

/// The hash consensus contract and the report contract behind it.
pub trait QuorumProtocolPort {
    /// Hash this member has already submitted for the frame, if any.
    fn member_report_hash(&self, block_stamp: &BlockStamp) -> Result<Option<H256>>;

    fn submit_report_hash(
        &self,
        block_stamp: &BlockStamp,
        report_hash: H256,
        consensus_version: u64,
    ) -> Result<()>;

    /// Hash that reached quorum for the frame, if any.
    fn consensus_report_hash(&self, block_stamp: &BlockStamp) -> Result<Option<H256>>;

    fn submit_report_data(&self, report: &Report) -> Result<()>;
}

/// A module producing one kind of oracle report.
pub trait ReportModule {
    fn consensus_version(&self) -> u64;

    fn processing_state(&self, block_stamp: &BlockStamp) -> Result<ProcessingState>;

    /// Must be a pure function of `block_stamp` and the chain state it points to.
    fn build_report(&self, block_stamp: &BlockStamp) -> Result<Report>;
}

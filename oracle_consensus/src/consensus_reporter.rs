use anyhow::Result;
use logging::{debug_in, error_in, info_in, warn_in, Logger};
use parking_lot::Mutex;
use strum::Display;
use types::{error::ProtocolError, nonstandard::BlockStamp};

use crate::{
    ports::{FrameClockPort, QuorumProtocolPort, ReportModule},
    report_cache::ReportCache,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    AwaitingFrame,
    NotYetReported,
    HashSubmitted,
    AwaitingQuorum,
    DataSubmitted,
    Done,
    /// Building the report failed with a [`ProtocolError`] or the report contract has moved on to
    /// a later frame. Nothing more is done in the frame.
    Abandoned,
}

#[derive(Clone, Copy)]
struct FrameProgress {
    block_stamp: BlockStamp,
    phase: Phase,
}

/// Drives one report module through the hash consensus protocol.
///
/// Every call to [`ConsensusReporter::tick`] performs at most one step for the current frame.
/// The phase is reset when the frame clock reports a new reference point.
pub struct ConsensusReporter<C, Q, M> {
    clock: C,
    quorum: Q,
    module: M,
    cache: ReportCache,
    progress: Mutex<Option<FrameProgress>>,
    logger: Logger,
}

impl<C: FrameClockPort, Q: QuorumProtocolPort, M: ReportModule> ConsensusReporter<C, Q, M> {
    #[must_use]
    pub fn new(clock: C, quorum: Q, module: M, logger: Logger) -> Self {
        Self {
            clock,
            quorum,
            module,
            cache: ReportCache::default(),
            progress: Mutex::new(None),
            logger,
        }
    }

    #[must_use]
    pub const fn module(&self) -> &M {
        &self.module
    }

    pub fn tick(&self) -> Result<Phase> {
        let Some(block_stamp) = self.clock.reference_block_stamp()? else {
            debug_in!(self.logger, "reference slot of current frame is not finalized yet");
            return Ok(Phase::AwaitingFrame);
        };

        let mut progress = self.progress.lock();

        let phase = match *progress {
            Some(frame) if frame.block_stamp == block_stamp => frame.phase,
            _ => {
                info_in!(self.logger, "new frame at {block_stamp}");
                Phase::NotYetReported
            }
        };

        let next_phase = match self.step(&block_stamp, phase) {
            Ok(next_phase) => next_phase,
            Err(error) if ProtocolError::is_in_chain_of(&error) => {
                error_in!(
                    self.logger,
                    "abandoning frame at {block_stamp}: {error:#}",
                );

                *progress = Some(FrameProgress {
                    block_stamp,
                    phase: Phase::Abandoned,
                });

                return Err(error);
            }
            Err(error) => {
                *progress = Some(FrameProgress { block_stamp, phase });
                return Err(error);
            }
        };

        if next_phase != phase {
            debug_in!(self.logger, "{phase} -> {next_phase}");
        }

        *progress = Some(FrameProgress {
            block_stamp,
            phase: next_phase,
        });

        Ok(next_phase)
    }

    fn step(&self, block_stamp: &BlockStamp, phase: Phase) -> Result<Phase> {
        if matches!(phase, Phase::Done | Phase::Abandoned) {
            return Ok(phase);
        }

        let processing_state = self.module.processing_state(block_stamp)?;

        if processing_state.data_submitted {
            info_in!(
                self.logger,
                "report data for {block_stamp} has already been submitted",
            );

            return Ok(Phase::Done);
        }

        if processing_state.current_frame_ref_slot > block_stamp.ref_slot {
            warn_in!(
                self.logger,
                "report contract is processing ref slot {}, dropping frame at {block_stamp}",
                processing_state.current_frame_ref_slot,
            );

            return Ok(Phase::Abandoned);
        }

        let report = self
            .cache
            .get_or_try_build(block_stamp, || self.module.build_report(block_stamp))?;

        let report_hash = report.hash();

        match phase {
            Phase::AwaitingFrame | Phase::NotYetReported => {
                if self.quorum.member_report_hash(block_stamp)? == Some(report_hash) {
                    info_in!(
                        self.logger,
                        "report hash {report_hash:?} has already been submitted",
                    );
                } else {
                    self.quorum.submit_report_hash(
                        block_stamp,
                        report_hash,
                        self.module.consensus_version(),
                    )?;

                    info_in!(self.logger, "submitted report hash {report_hash:?}");
                }

                Ok(Phase::HashSubmitted)
            }
            Phase::HashSubmitted | Phase::AwaitingQuorum => {
                match self.quorum.consensus_report_hash(block_stamp)? {
                    None => Ok(Phase::AwaitingQuorum),
                    Some(consensus_hash) if consensus_hash != report_hash => {
                        warn_in!(
                            self.logger,
                            "quorum reached on report hash {consensus_hash:?} \
                             that differs from ours ({report_hash:?})",
                        );

                        Ok(Phase::AwaitingQuorum)
                    }
                    Some(_) => {
                        self.quorum.submit_report_data(&report)?;

                        info_in!(
                            self.logger,
                            "submitted report data with {} requests",
                            report.requests_count,
                        );

                        Ok(Phase::DataSubmitted)
                    }
                }
            }
            // The data transaction is pending until the report contract marks it as processed.
            Phase::DataSubmitted => Ok(Phase::DataSubmitted),
            Phase::Done | Phase::Abandoned => Ok(phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::{Cell, RefCell};
    use std::borrow::Cow;

    use anyhow::bail;
    use hex_literal::hex;
    use types::{phase0::primitives::H256, staking::ProcessingState};

    use crate::report::Report;

    use super::*;

    const OTHER_HASH: H256 = H256(hex!(
        "1111111111111111111111111111111111111111111111111111111111111111"
    ));

    #[derive(Default)]
    struct FakeClock {
        block_stamp: Cell<Option<BlockStamp>>,
    }

    impl FrameClockPort for &FakeClock {
        fn reference_block_stamp(&self) -> Result<Option<BlockStamp>> {
            Ok(self.block_stamp.get())
        }
    }

    #[derive(Default)]
    struct FakeQuorum {
        member_hash: Cell<Option<H256>>,
        consensus_hash: Cell<Option<H256>>,
        submitted_hashes: RefCell<Vec<(u64, H256, u64)>>,
        submitted_reports: RefCell<Vec<Report>>,
    }

    impl QuorumProtocolPort for &FakeQuorum {
        fn member_report_hash(&self, _block_stamp: &BlockStamp) -> Result<Option<H256>> {
            Ok(self.member_hash.get())
        }

        fn submit_report_hash(
            &self,
            block_stamp: &BlockStamp,
            report_hash: H256,
            consensus_version: u64,
        ) -> Result<()> {
            self.submitted_hashes.borrow_mut().push((
                block_stamp.ref_slot,
                report_hash,
                consensus_version,
            ));

            self.member_hash.set(Some(report_hash));

            Ok(())
        }

        fn consensus_report_hash(&self, _block_stamp: &BlockStamp) -> Result<Option<H256>> {
            Ok(self.consensus_hash.get())
        }

        fn submit_report_data(&self, report: &Report) -> Result<()> {
            self.submitted_reports.borrow_mut().push(report.clone());
            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum BuildOutcome {
        Report,
        Unavailable,
        Inconsistent,
    }

    struct FakeModule {
        outcome: Cell<BuildOutcome>,
        data_submitted: Cell<bool>,
        contract_ref_slot: Cell<Option<u64>>,
        builds: Cell<usize>,
    }

    impl Default for FakeModule {
        fn default() -> Self {
            Self {
                outcome: Cell::new(BuildOutcome::Report),
                data_submitted: Cell::new(false),
                contract_ref_slot: Cell::new(None),
                builds: Cell::new(0),
            }
        }
    }

    impl ReportModule for &FakeModule {
        fn consensus_version(&self) -> u64 {
            1
        }

        fn processing_state(&self, block_stamp: &BlockStamp) -> Result<ProcessingState> {
            Ok(ProcessingState {
                current_frame_ref_slot: self
                    .contract_ref_slot
                    .get()
                    .unwrap_or(block_stamp.ref_slot),
                data_submitted: self.data_submitted.get(),
                ..ProcessingState::default()
            })
        }

        fn build_report(&self, block_stamp: &BlockStamp) -> Result<Report> {
            self.builds.set(self.builds.get() + 1);

            match self.outcome.get() {
                BuildOutcome::Report => Ok(report(block_stamp.ref_slot)),
                BuildOutcome::Unavailable => bail!("consensus node is unavailable"),
                BuildOutcome::Inconsistent => Err(ProtocolError::InconsistentProtocolState {
                    details: Cow::Borrowed("event sets differ"),
                }
                .into()),
            }
        }
    }

    struct Fakes {
        clock: FakeClock,
        quorum: FakeQuorum,
        module: FakeModule,
    }

    impl Fakes {
        fn new() -> Self {
            let fakes = Self {
                clock: FakeClock::default(),
                quorum: FakeQuorum::default(),
                module: FakeModule::default(),
            };

            fakes.clock.block_stamp.set(Some(block_stamp(7200)));

            fakes
        }

        fn reporter(&self) -> ConsensusReporter<&FakeClock, &FakeQuorum, &FakeModule> {
            ConsensusReporter::new(
                &self.clock,
                &self.quorum,
                &self.module,
                Logger::new("test_module"),
            )
        }
    }

    fn block_stamp(ref_slot: u64) -> BlockStamp {
        BlockStamp {
            ref_slot,
            ref_epoch: ref_slot / 32,
            slot: ref_slot,
            block_number: ref_slot + 1000,
            block_hash: H256::repeat_byte(0xbb),
            state_root: H256::repeat_byte(0x55),
        }
    }

    fn report(ref_slot: u64) -> Report {
        Report {
            consensus_version: 1,
            ref_slot,
            ..Report::default()
        }
    }

    #[test]
    fn reporter_waits_for_frame() -> Result<()> {
        let fakes = Fakes::new();
        fakes.clock.block_stamp.set(None);

        assert_eq!(fakes.reporter().tick()?, Phase::AwaitingFrame);
        assert_eq!(fakes.module.builds.get(), 0);

        Ok(())
    }

    #[test]
    fn reporter_goes_through_all_phases() -> Result<()> {
        let fakes = Fakes::new();
        let reporter = fakes.reporter();
        let report_hash = report(7200).hash();

        assert_eq!(reporter.tick()?, Phase::HashSubmitted);
        assert_eq!(
            *fakes.quorum.submitted_hashes.borrow(),
            [(7200, report_hash, 1)],
        );

        assert_eq!(reporter.tick()?, Phase::AwaitingQuorum);
        assert!(fakes.quorum.submitted_reports.borrow().is_empty());

        fakes.quorum.consensus_hash.set(Some(report_hash));

        assert_eq!(reporter.tick()?, Phase::DataSubmitted);
        assert_eq!(reporter.tick()?, Phase::DataSubmitted);
        assert_eq!(*fakes.quorum.submitted_reports.borrow(), [report(7200)]);

        fakes.module.data_submitted.set(true);

        assert_eq!(reporter.tick()?, Phase::Done);
        assert_eq!(reporter.tick()?, Phase::Done);

        assert_eq!(fakes.quorum.submitted_hashes.borrow().len(), 1);
        assert_eq!(fakes.module.builds.get(), 1);

        Ok(())
    }

    #[test]
    fn reporter_does_not_resubmit_own_hash() -> Result<()> {
        let fakes = Fakes::new();
        fakes.quorum.member_hash.set(Some(report(7200).hash()));

        assert_eq!(fakes.reporter().tick()?, Phase::HashSubmitted);
        assert!(fakes.quorum.submitted_hashes.borrow().is_empty());

        Ok(())
    }

    #[test]
    fn reporter_does_not_submit_data_for_other_hash() -> Result<()> {
        let fakes = Fakes::new();
        let reporter = fakes.reporter();

        fakes.quorum.consensus_hash.set(Some(OTHER_HASH));

        assert_eq!(reporter.tick()?, Phase::HashSubmitted);
        assert_eq!(reporter.tick()?, Phase::AwaitingQuorum);
        assert_eq!(reporter.tick()?, Phase::AwaitingQuorum);
        assert!(fakes.quorum.submitted_reports.borrow().is_empty());

        Ok(())
    }

    #[test]
    fn reporter_skips_frame_with_submitted_data() -> Result<()> {
        let fakes = Fakes::new();
        fakes.module.data_submitted.set(true);

        assert_eq!(fakes.reporter().tick()?, Phase::Done);
        assert_eq!(fakes.module.builds.get(), 0);

        Ok(())
    }

    #[test]
    fn reporter_drops_frame_the_contract_has_moved_past() -> Result<()> {
        let fakes = Fakes::new();
        let reporter = fakes.reporter();

        assert_eq!(reporter.tick()?, Phase::HashSubmitted);

        fakes.module.contract_ref_slot.set(Some(14_400));
        fakes.quorum.consensus_hash.set(Some(report(7200).hash()));

        assert_eq!(reporter.tick()?, Phase::Abandoned);
        assert_eq!(reporter.tick()?, Phase::Abandoned);
        assert!(fakes.quorum.submitted_reports.borrow().is_empty());

        Ok(())
    }

    #[test]
    fn reporter_abandons_frame_with_inconsistent_state() -> Result<()> {
        let fakes = Fakes::new();
        let reporter = fakes.reporter();

        fakes.module.outcome.set(BuildOutcome::Inconsistent);

        reporter.tick().expect_err("building the report should fail");

        assert_eq!(reporter.tick()?, Phase::Abandoned);
        assert_eq!(fakes.module.builds.get(), 1);
        assert!(fakes.quorum.submitted_hashes.borrow().is_empty());

        fakes.module.outcome.set(BuildOutcome::Report);
        fakes.clock.block_stamp.set(Some(block_stamp(14_400)));

        assert_eq!(reporter.tick()?, Phase::HashSubmitted);

        Ok(())
    }

    #[test]
    fn reporter_retries_after_transient_failure() -> Result<()> {
        let fakes = Fakes::new();
        let reporter = fakes.reporter();

        fakes.module.outcome.set(BuildOutcome::Unavailable);

        let error = reporter.tick().expect_err("building the report should fail");
        assert!(!ProtocolError::is_in_chain_of(&error));

        fakes.module.outcome.set(BuildOutcome::Report);

        assert_eq!(reporter.tick()?, Phase::HashSubmitted);
        assert_eq!(fakes.module.builds.get(), 2);

        Ok(())
    }

    #[test]
    fn phases_are_displayed_in_snake_case() {
        assert_eq!(Phase::NotYetReported.to_string(), "not_yet_reported");
    }
}

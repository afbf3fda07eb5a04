pub use crate::{
    consensus_reporter::{ConsensusReporter, Phase},
    ports::{FrameClockPort, QuorumProtocolPort, ReportModule},
    report::Report,
    report_cache::ReportCache,
};

mod consensus_reporter;
mod ports;
mod report;
mod report_cache;

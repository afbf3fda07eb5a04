use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use types::nonstandard::BlockStamp;

use crate::report::Report;

/// Remembers the report built for the most recent reference point.
///
/// A report for a different reference point replaces the cached one. Failed builds are not cached.
#[derive(Default)]
pub struct ReportCache {
    last: Mutex<Option<CachedReport>>,
}

struct CachedReport {
    block_stamp: BlockStamp,
    report: Arc<Report>,
}

impl ReportCache {
    pub fn get_or_try_build(
        &self,
        block_stamp: &BlockStamp,
        build: impl FnOnce() -> Result<Report>,
    ) -> Result<Arc<Report>> {
        let mut last = self.last.lock();

        if let Some(cached) = last.as_ref() {
            if cached.block_stamp == *block_stamp {
                return Ok(Arc::clone(&cached.report));
            }
        }

        let report = Arc::new(build()?);

        *last = Some(CachedReport {
            block_stamp: *block_stamp,
            report: Arc::clone(&report),
        });

        Ok(report)
    }

    pub fn clear(&self) {
        *self.last.lock() = None;
    }
}

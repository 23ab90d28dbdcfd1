//! Wait-window overseer
//!
//! Sits between the host's scan driver and the document pipeline. While an
//! overrun is recorded the overseer answers for the pipeline: `has_next`
//! reports more-available so the driver keeps pulling, `next` re-surfaces
//! the overrun, and `document` converts it into a single synthetic
//! placeholder that tells the host where to resume. Consuming the
//! placeholder returns the overseer to normal operation, so a resumed scan
//! behaves identically to a fresh one.

use crate::observability::ScanLogger;
use crate::pipeline::{Document, Key, Range, ScanIterator, ScanResult, Step};

use super::YieldPoint;

/// Normal/Overrun state machine wrapping a scan pipeline.
pub struct WaitWindowOverseer<I: ScanIterator> {
    source: I,
    overrun: Option<YieldPoint>,
    log: ScanLogger,
}

impl<I: ScanIterator> WaitWindowOverseer<I> {
    /// Wraps a pipeline.
    pub fn new(source: I) -> Self {
        Self {
            source,
            overrun: None,
            log: ScanLogger::new(),
        }
    }

    /// True while an overrun is recorded and unconsumed.
    pub fn overrun_pending(&self) -> bool {
        self.overrun.is_some()
    }

    fn record(&mut self, yield_point: YieldPoint) -> &YieldPoint {
        self.overrun.get_or_insert(yield_point)
    }
}

impl<I: ScanIterator> ScanIterator for WaitWindowOverseer<I> {
    fn initialize(&mut self) -> ScanResult<Step<()>> {
        // Skip when an overrun is already recorded.
        if self.overrun.is_some() {
            return Ok(Step::Ready(()));
        }
        match self.source.initialize()? {
            Step::Overrun(yield_point) => {
                self.record(yield_point);
                Ok(Step::Ready(()))
            }
            ready => Ok(ready),
        }
    }

    fn seek(
        &mut self,
        range: &Range,
        column_families: &[String],
        inclusive: bool,
    ) -> ScanResult<Step<()>> {
        // A fresh range supersedes any recorded overrun.
        self.overrun = None;
        match self.source.seek(range, column_families, inclusive)? {
            Step::Overrun(yield_point) => {
                self.record(yield_point);
                Ok(Step::Ready(()))
            }
            ready => Ok(ready),
        }
    }

    fn has_next(&mut self) -> ScanResult<Step<bool>> {
        if self.overrun.is_some() {
            return Ok(Step::Ready(true));
        }
        match self.source.has_next()? {
            Step::Overrun(yield_point) => {
                // Swallow: report more-available so the driver proceeds to
                // next()/document() and receives the placeholder.
                self.record(yield_point);
                Ok(Step::Ready(true))
            }
            ready => Ok(ready),
        }
    }

    fn next(&mut self) -> ScanResult<Step<Key>> {
        if let Some(yield_point) = &self.overrun {
            return Ok(Step::Overrun(yield_point.clone()));
        }
        match self.source.next()? {
            Step::Overrun(yield_point) => {
                let recorded = self.record(yield_point).clone();
                Ok(Step::Overrun(recorded))
            }
            ready => Ok(ready),
        }
    }

    fn document(&mut self) -> ScanResult<Document> {
        match self.overrun.take() {
            Some(yield_point) => {
                self.log.info(
                    "SCAN_RESUME_HANDOFF",
                    &[
                        ("family", yield_point.yield_key().family.as_str()),
                        ("row", yield_point.yield_key().row.as_str()),
                    ],
                );
                Ok(Document::overrun_placeholder(yield_point))
            }
            None => self.source.document(),
        }
    }
}

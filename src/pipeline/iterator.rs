//! Document iterator pipeline
//!
//! Consumes the final merged candidate stream and drives the store cursor:
//! each candidate term expands into per-document ranges (explicit uids) or
//! one whole-shard range (count-only), and the cursor's column entries are
//! assembled into documents in ascending key order.
//!
//! Call protocol: `initialize()` once, `seek()` to bound the scan,
//! then `has_next()` / `next()` / `document()` in that order. `has_next`
//! stages the next document and is repeatable; `next` promotes the staged
//! document and returns its key; `document` hands out the promoted
//! document exactly once.

use std::collections::VecDeque;

use crate::observability::ScanLogger;
use crate::stream::{IndexStream, Term};
use crate::uid::Uid;
use crate::waitwindow::{WaitWindowObserver, YieldPoint};

use super::document::Document;
use super::errors::{ScanError, ScanResult};
use super::store::{Key, Range, SortedCursor};

/// Outcome of a call that is subject to the wait window: a completed value
/// or a typed yield carrying the resume position. An overrun is not a
/// failure; it propagates unchanged through every wrapping layer until the
/// overseer converts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    Ready(T),
    Overrun(YieldPoint),
}

impl<T> Step<T> {
    /// True for the overrun arm.
    pub fn is_overrun(&self) -> bool {
        matches!(self, Step::Overrun(_))
    }

    /// The completed value, if any.
    pub fn ready(self) -> Option<T> {
        match self {
            Step::Ready(value) => Some(value),
            Step::Overrun(_) => None,
        }
    }
}

/// Host-facing scan surface.
///
/// One instance per logical scan, driven by a single sequential consumer.
pub trait ScanIterator {
    /// Prepares the scan. Must precede every other call.
    fn initialize(&mut self) -> ScanResult<Step<()>>;

    /// Bounds the scan to `range` and positions it at the start. Also the
    /// resume entry point after a wait-window checkpoint.
    fn seek(
        &mut self,
        range: &Range,
        column_families: &[String],
        inclusive: bool,
    ) -> ScanResult<Step<()>>;

    /// Stages the next document. Idempotent and repeatable.
    fn has_next(&mut self) -> ScanResult<Step<bool>>;

    /// Promotes the staged document and returns its key. Fails without a
    /// prior successful `has_next`.
    fn next(&mut self) -> ScanResult<Step<Key>>;

    /// The document produced by the last `next`. Valid exactly once.
    fn document(&mut self) -> ScanResult<Document>;
}

/// One expanded unit of candidate work.
#[derive(Debug, Clone)]
enum Candidate {
    /// A single document's column range.
    Document { term: Term, uid: Uid },
    /// A whole shard row; documents are discovered by grouping entries.
    Shard { term: Term },
}

/// Drives the store cursor over the merged candidate stream.
pub struct DocumentPipeline<C: SortedCursor> {
    candidates: Box<dyn IndexStream>,
    cursor: C,
    observer: WaitWindowObserver,
    log: ScanLogger,
    bounds: Option<Range>,
    column_families: Vec<String>,
    pending: VecDeque<Candidate>,
    shard_active: Option<Term>,
    staged: Option<(Key, Document)>,
    produced: Option<Document>,
    initialized: bool,
    finished: bool,
    docs_returned: u64,
}

impl<C: SortedCursor> DocumentPipeline<C> {
    /// Creates a pipeline over a merged candidate stream and store cursor.
    pub fn new(candidates: Box<dyn IndexStream>, cursor: C, observer: WaitWindowObserver) -> Self {
        Self {
            candidates,
            cursor,
            observer,
            log: ScanLogger::new(),
            bounds: None,
            column_families: Vec::new(),
            pending: VecDeque::new(),
            shard_active: None,
            staged: None,
            produced: None,
            initialized: false,
            finished: false,
            docs_returned: 0,
        }
    }

    /// Clamps a cursor range's end to the scan bounds.
    fn clamp_end(&self, mut range: Range) -> Range {
        if let Some(bounds) = &self.bounds {
            if bounds.end < range.end {
                range.end = bounds.end.clone();
            }
        }
        range
    }

    /// Whether a candidate's start key lies before the scan's start bound.
    fn before_start(&self, key: &Key) -> bool {
        match &self.bounds {
            Some(bounds) if bounds.start_inclusive => *key < bounds.start,
            Some(bounds) => *key <= bounds.start,
            None => false,
        }
    }

    /// Whether a candidate's start key lies at or beyond the end bound.
    fn beyond_end(&self, key: &Key) -> bool {
        match &self.bounds {
            Some(bounds) => *key >= bounds.end,
            None => false,
        }
    }

    /// Expands one candidate term into pending work units, honoring bounds.
    /// Returns false when the term proves the stream is past the end bound.
    fn expand_term(&mut self, term: Term, uids: Vec<Uid>) -> bool {
        if let Some(bounds) = &self.bounds {
            if term > bounds.end.row {
                return false;
            }
        }
        if !uids.is_empty() {
            for uid in uids {
                let start = Key::document_start(term.as_str(), &uid);
                if self.before_start(&start) {
                    continue;
                }
                if self.beyond_end(&start) {
                    // Terms are ascending, so everything later is out too.
                    return false;
                }
                self.pending.push_back(Candidate::Document {
                    term: term.clone(),
                    uid,
                });
            }
        } else {
            self.pending.push_back(Candidate::Shard { term });
        }
        true
    }

    /// Collects the column entries of one document family at the cursor.
    fn collect_document(&mut self, term: &str, family: &str) -> ScanResult<Document> {
        let uid = Uid::parse(family)?;
        let mut doc = Document::new(uid);
        loop {
            let entry = match (self.cursor.top_key(), self.cursor.top_value()) {
                (Some(key), Some(value)) if key.row == term && key.family == family => {
                    Some((key.qualifier.clone(), value.clone()))
                }
                _ => None,
            };
            match entry {
                Some((qualifier, value)) => {
                    doc.put(qualifier, value);
                    self.cursor.advance()?;
                }
                None => break,
            }
        }
        Ok(doc)
    }

    /// Stages the next document, pulling candidates as needed.
    fn stage(&mut self) -> ScanResult<Step<bool>> {
        loop {
            if self.staged.is_some() {
                return Ok(Step::Ready(true));
            }

            // Continue an in-progress whole-shard scan.
            if let Some(term) = self.shard_active.clone() {
                let top = match self.cursor.top_key() {
                    Some(key) if key.row == term => Some(key.clone()),
                    _ => None,
                };
                match top {
                    Some(key) => {
                        if self.observer.exceeded() {
                            return Ok(self.overrun_at(key, "shard scan"));
                        }
                        let doc = self.collect_document(&term, &key.family)?;
                        self.staged = Some((Key::new(term.as_str(), key.family.as_str(), ""), doc));
                        self.observer.note_work();
                        return Ok(Step::Ready(true));
                    }
                    None => {
                        self.shard_active = None;
                        continue;
                    }
                }
            }

            // Work through expanded candidates for the current term.
            if let Some(candidate) = self.pending.pop_front() {
                match candidate {
                    Candidate::Document { term, uid } => {
                        let start = Key::document_start(term.as_str(), &uid);
                        if self.observer.exceeded() {
                            self.pending.push_front(Candidate::Document { term, uid });
                            return Ok(self.overrun_at(start, "document assembly"));
                        }
                        let range = self.clamp_end(Range::document(&term, &uid));
                        let families = self.column_families.clone();
                        self.cursor.seek(&range, &families, true)?;
                        let doc = self.collect_document(&term, uid.as_str())?;
                        if doc.is_empty() {
                            // Indexed candidate with no stored columns; skip.
                            continue;
                        }
                        self.staged = Some((start, doc));
                        self.observer.note_work();
                        return Ok(Step::Ready(true));
                    }
                    Candidate::Shard { term } => {
                        let mut range = self.clamp_end(Range::shard(&term));
                        let mut inclusive = true;
                        if let Some(bounds) = &self.bounds {
                            if bounds.start.row == term && bounds.start > range.start {
                                range.start = bounds.start.clone();
                                inclusive = bounds.start_inclusive;
                            }
                        }
                        if self.observer.exceeded() {
                            self.pending.push_front(Candidate::Shard { term });
                            return Ok(self.overrun_at(range.start.clone(), "shard scan"));
                        }
                        let families = self.column_families.clone();
                        self.cursor.seek(&range, &families, inclusive)?;
                        self.shard_active = Some(term);
                        continue;
                    }
                }
            }

            // Pull the next candidate term from the merged stream.
            match self.candidates.next() {
                Some((term, info)) => {
                    let uids: Vec<Uid> = info.uids().cloned().collect();
                    if !self.expand_term(term, uids) {
                        self.finish();
                        return Ok(Step::Ready(false));
                    }
                }
                None => {
                    self.finish();
                    return Ok(Step::Ready(false));
                }
            }
        }
    }

    fn overrun_at(&self, key: Key, layer: &str) -> Step<bool> {
        self.log.info(
            "SCAN_OVERRUN",
            &[
                ("family", key.family.as_str()),
                ("layer", layer),
                ("row", key.row.as_str()),
            ],
        );
        Step::Overrun(YieldPoint::new(key, layer))
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            let returned = self.docs_returned.to_string();
            self.log.info("SCAN_COMPLETE", &[("documents", returned.as_str())]);
        }
    }
}

impl<C: SortedCursor> ScanIterator for DocumentPipeline<C> {
    fn initialize(&mut self) -> ScanResult<Step<()>> {
        self.initialized = true;
        self.log.trace("SCAN_INIT", &[]);
        Ok(Step::Ready(()))
    }

    fn seek(
        &mut self,
        range: &Range,
        column_families: &[String],
        inclusive: bool,
    ) -> ScanResult<Step<()>> {
        if !self.initialized {
            return Err(ScanError::NotInitialized);
        }

        self.log.info(
            "SCAN_SEEK",
            &[
                ("family", range.start.family.as_str()),
                ("inclusive", if inclusive { "true" } else { "false" }),
                ("row", range.start.row.as_str()),
            ],
        );

        self.bounds = Some(Range::new(range.start.clone(), range.end.clone(), inclusive));
        self.column_families = column_families.to_vec();
        self.staged = None;
        self.produced = None;
        self.finished = false;
        // A seek starts a fresh host invocation with a fresh budget.
        self.observer.reset();

        // The candidate stream is single-pass, so a resume range landing
        // mid-term must keep the work already expanded for that term. An
        // interrupted shard scan goes back on the queue; its cursor range
        // restarts at the new bound.
        if let Some(term) = self.shard_active.take() {
            self.pending.push_front(Candidate::Shard { term });
        }
        let retained: VecDeque<Candidate> = std::mem::take(&mut self.pending)
            .into_iter()
            .filter(|candidate| match candidate {
                Candidate::Document { term, uid } => {
                    let start = Key::document_start(term.as_str(), uid);
                    !self.before_start(&start) && !self.beyond_end(&start)
                }
                Candidate::Shard { term } => {
                    // A shard range may straddle the new start key.
                    let bounds = self.bounds.as_ref();
                    bounds.map_or(true, |b| *term >= b.start.row && *term <= b.end.row)
                }
            })
            .collect();
        self.pending = retained;

        self.candidates.seek(&range.start.row);
        Ok(Step::Ready(()))
    }

    fn has_next(&mut self) -> ScanResult<Step<bool>> {
        if !self.initialized {
            return Err(ScanError::NotInitialized);
        }
        self.stage()
    }

    fn next(&mut self) -> ScanResult<Step<Key>> {
        if !self.initialized {
            return Err(ScanError::NotInitialized);
        }
        match self.staged.take() {
            Some((key, doc)) => {
                self.produced = Some(doc);
                self.docs_returned += 1;
                Ok(Step::Ready(key))
            }
            None => Err(ScanError::NotReady),
        }
    }

    fn document(&mut self) -> ScanResult<Document> {
        self.produced.take().ok_or(ScanError::NoDocument)
    }
}

//! Leaf index stream over resolved per-term candidate sets
//!
//! The planner resolves each leaf predicate against the global index and
//! hands the per-term candidate sets here in ascending term order. A leaf
//! that found no data, covers an unindexed field, or cannot be evaluated
//! against the index at all is represented by the same type with the
//! corresponding construction-time context.

use std::collections::VecDeque;

use crate::query::NodeId;

use super::{IndexInfo, IndexStream, StreamContext, Term};

/// Leaf stream for a single resolved predicate.
#[derive(Debug)]
pub struct ScannerStream {
    node: NodeId,
    entries: VecDeque<(Term, IndexInfo)>,
    context: StreamContext,
}

impl ScannerStream {
    /// A leaf with index data, one info per term in ascending term order.
    pub fn with_data(node: NodeId, entries: Vec<(Term, IndexInfo)>) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].0 < w[1].0),
            "leaf entries must be strictly ascending by term"
        );
        let context = if !entries.is_empty() && entries.iter().all(|(_, info)| info.has_uids()) {
            StreamContext::Distributable
        } else if entries.is_empty() {
            StreamContext::Absent
        } else {
            StreamContext::Present
        };
        Self {
            node,
            entries: entries.into(),
            context,
        }
    }

    /// A leaf that was resolved against the index and found nothing.
    pub fn absent(node: NodeId) -> Self {
        Self {
            node,
            entries: VecDeque::new(),
            context: StreamContext::Absent,
        }
    }

    /// A leaf over a field that is not indexed.
    pub fn unindexed(node: NodeId) -> Self {
        Self {
            node,
            entries: VecDeque::new(),
            context: StreamContext::Unindexed,
        }
    }

    /// A leaf that cannot be evaluated against the index; it gates a parent
    /// intersection without filtering candidates.
    pub fn non_distributable(node: NodeId) -> Self {
        Self {
            node,
            entries: VecDeque::new(),
            context: StreamContext::NonDistributable,
        }
    }
}

impl IndexStream for ScannerStream {
    fn context(&self) -> StreamContext {
        if self.entries.is_empty() && self.context.has_data() {
            return StreamContext::NoDocument;
        }
        self.context
    }

    fn node(&self) -> NodeId {
        self.node
    }

    fn peek(&mut self) -> Option<&(Term, IndexInfo)> {
        self.entries.front()
    }

    fn has_next(&mut self) -> bool {
        !self.entries.is_empty()
    }

    fn next(&mut self) -> Option<(Term, IndexInfo)> {
        self.entries.pop_front()
    }

    fn seek(&mut self, target: &str) -> Option<Term> {
        while let Some((term, _)) = self.entries.front() {
            if term.as_str() >= target {
                return Some(term.clone());
            }
            self.entries.pop_front();
        }
        None
    }
}

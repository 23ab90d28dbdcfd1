//! Intersection combinator (boolean AND)
//!
//! Sorted-merge join keyed by term: seeks the lesser side forward when
//! terms differ, consumes both when they agree, and combines the two match
//! sets through the configured uid intersector. A side that cannot be
//! evaluated against the index gates the result without filtering it.

use std::sync::Arc;

use crate::query::NodeId;
use crate::uid::UidIntersector;

use super::{IndexInfo, IndexStream, StreamContext, Term};

/// AND of two index streams.
///
/// Exhaustion of either child exhausts the intersection; a term whose
/// combined match set is empty is dropped rather than emitted.
pub struct Intersection {
    node: NodeId,
    left: Box<dyn IndexStream>,
    right: Box<dyn IndexStream>,
    intersector: Arc<dyn UidIntersector>,
    lookahead: Option<(Term, IndexInfo)>,
    exhausted: bool,
}

impl Intersection {
    /// Builds the conjunction of two child streams under `node`.
    pub fn new(
        node: NodeId,
        left: Box<dyn IndexStream>,
        right: Box<dyn IndexStream>,
        intersector: Arc<dyn UidIntersector>,
    ) -> Self {
        Self {
            node,
            left,
            right,
            intersector,
            lookahead: None,
            exhausted: false,
        }
    }

    fn fill(&mut self) {
        if self.lookahead.is_some() || self.exhausted {
            return;
        }

        let left_gates = self.left.context().is_gating();
        let right_gates = self.right.context().is_gating();

        if left_gates && right_gates {
            // Neither side can enumerate candidates.
            return;
        }

        if left_gates || right_gates {
            // The gating side filters nothing; stream the other side.
            let side = if left_gates { &mut self.right } else { &mut self.left };
            match side.next() {
                Some((term, info)) => self.lookahead = Some((term, info.relabel(self.node))),
                None => self.exhausted = true,
            }
            return;
        }

        loop {
            let left_term = match self.left.peek() {
                Some((term, _)) => term.clone(),
                None => {
                    self.exhausted = true;
                    return;
                }
            };
            let right_term = match self.right.peek() {
                Some((term, _)) => term.clone(),
                None => {
                    self.exhausted = true;
                    return;
                }
            };

            if left_term < right_term {
                if self.left.seek(&right_term).is_none() {
                    self.exhausted = true;
                    return;
                }
            } else if right_term < left_term {
                if self.right.seek(&left_term).is_none() {
                    self.exhausted = true;
                    return;
                }
            } else {
                let (term, left_info) = match self.left.next() {
                    Some(element) => element,
                    None => {
                        self.exhausted = true;
                        return;
                    }
                };
                let right_info = match self.right.next() {
                    Some((_, info)) => info,
                    None => {
                        self.exhausted = true;
                        return;
                    }
                };

                if let Some(info) =
                    left_info.intersect(&right_info, self.node, self.intersector.as_ref())
                {
                    self.lookahead = Some((term, info));
                    return;
                }
                // No candidate satisfied both sides for this term; keep merging.
            }
        }
    }
}

impl IndexStream for Intersection {
    fn context(&self) -> StreamContext {
        if let Some((_, info)) = &self.lookahead {
            if info.has_uids() {
                return StreamContext::Distributable;
            }
            return StreamContext::Present;
        }
        let combined = StreamContext::for_intersection(self.left.context(), self.right.context());
        if self.exhausted && combined != StreamContext::Absent {
            return StreamContext::NoDocument;
        }
        combined
    }

    fn node(&self) -> NodeId {
        self.node
    }

    fn peek(&mut self) -> Option<&(Term, IndexInfo)> {
        self.fill();
        self.lookahead.as_ref()
    }

    fn has_next(&mut self) -> bool {
        self.fill();
        self.lookahead.is_some()
    }

    fn next(&mut self) -> Option<(Term, IndexInfo)> {
        self.fill();
        self.lookahead.take()
    }

    fn seek(&mut self, target: &str) -> Option<Term> {
        if let Some((term, _)) = &self.lookahead {
            if term.as_str() >= target {
                return Some(term.clone());
            }
            self.lookahead = None;
        }
        if self.exhausted {
            return None;
        }

        let left_gates = self.left.context().is_gating();
        let right_gates = self.right.context().is_gating();
        if !left_gates && self.left.seek(target).is_none() {
            self.exhausted = true;
            return None;
        }
        if !right_gates && self.right.seek(target).is_none() {
            self.exhausted = true;
            return None;
        }
        if left_gates && right_gates {
            return None;
        }

        self.fill();
        self.lookahead.as_ref().map(|(term, _)| term.clone())
    }
}

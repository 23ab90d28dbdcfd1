//! Union combinator (boolean OR)
//!
//! Emits every term present in either side, combining match sets by set
//! union when both sides hold the term. One exhausted side does not
//! terminate the union; the other side keeps draining. A side that cannot
//! be evaluated against the index makes the whole union non-distributable.

use std::cmp::Ordering;

use crate::query::NodeId;

use super::{IndexInfo, IndexStream, StreamContext, Term};

/// OR of two index streams.
pub struct Union {
    node: NodeId,
    left: Box<dyn IndexStream>,
    right: Box<dyn IndexStream>,
    lookahead: Option<(Term, IndexInfo)>,
}

impl Union {
    /// Builds the disjunction of two child streams under `node`.
    pub fn new(node: NodeId, left: Box<dyn IndexStream>, right: Box<dyn IndexStream>) -> Self {
        Self {
            node,
            left,
            right,
            lookahead: None,
        }
    }

    fn gating(&self) -> bool {
        self.left.context().is_gating() || self.right.context().is_gating()
    }

    fn fill(&mut self) {
        if self.lookahead.is_some() {
            return;
        }
        if self.gating() {
            // A term that cannot be enumerated by index poisons the union;
            // candidates cannot be produced here.
            return;
        }

        let left_term = self.left.peek().map(|(term, _)| term.clone());
        let right_term = self.right.peek().map(|(term, _)| term.clone());

        match (left_term, right_term) {
            (None, None) => {}
            (Some(_), None) => {
                if let Some((term, info)) = self.left.next() {
                    self.lookahead = Some((term, info.relabel(self.node)));
                }
            }
            (None, Some(_)) => {
                if let Some((term, info)) = self.right.next() {
                    self.lookahead = Some((term, info.relabel(self.node)));
                }
            }
            (Some(l), Some(r)) => match l.cmp(&r) {
                Ordering::Less => {
                    if let Some((term, info)) = self.left.next() {
                        self.lookahead = Some((term, info.relabel(self.node)));
                    }
                }
                Ordering::Greater => {
                    if let Some((term, info)) = self.right.next() {
                        self.lookahead = Some((term, info.relabel(self.node)));
                    }
                }
                Ordering::Equal => {
                    if let (Some((term, left_info)), Some((_, right_info))) =
                        (self.left.next(), self.right.next())
                    {
                        self.lookahead = Some((term, left_info.union(&right_info, self.node)));
                    }
                }
            },
        }
    }
}

impl IndexStream for Union {
    fn context(&self) -> StreamContext {
        if let Some((_, info)) = &self.lookahead {
            if info.has_uids() {
                return StreamContext::Distributable;
            }
            return StreamContext::Present;
        }
        StreamContext::for_union(self.left.context(), self.right.context())
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
        if self.gating() {
            return None;
        }

        // Each side advances independently; the union survives while either
        // side still has data.
        let left_top = self.left.seek(target);
        let right_top = self.right.seek(target);
        if left_top.is_none() && right_top.is_none() {
            return None;
        }

        self.fill();
        self.lookahead.as_ref().map(|(term, _)| term.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{Cardinality, ScannerStream};
    use crate::uid::Uid;

    fn entry(term: &str, node: u32, uids: &[&str]) -> (Term, IndexInfo) {
        (
            term.to_string(),
            IndexInfo::from_uids(NodeId(node), uids.iter().map(|u| Uid::parse(*u).unwrap())),
        )
    }

    fn leaf(node: u32, entries: Vec<(Term, IndexInfo)>) -> Box<dyn IndexStream> {
        Box::new(ScannerStream::with_data(NodeId(node), entries))
    }

    #[test]
    fn test_emits_terms_from_either_side() {
        let left = leaf(1, vec![entry("a", 1, &["u1"]), entry("c", 1, &["u3"])]);
        let right = leaf(2, vec![entry("b", 2, &["u2"])]);

        let mut merged = Union::new(NodeId(9), left, right);
        let terms: Vec<Term> = std::iter::from_fn(|| merged.next().map(|(t, _)| t)).collect();
        assert_eq!(terms, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_shared_term_unions_matches() {
        let left = leaf(1, vec![entry("a", 1, &["u1"])]);
        let right = leaf(2, vec![entry("a", 2, &["u2"])]);

        let mut merged = Union::new(NodeId(9), left, right);
        let (term, info) = merged.next().unwrap();
        assert_eq!(term, "a");
        assert_eq!(info.count(), Cardinality::Exact(2));
        assert_eq!(info.node(), NodeId(9));
        assert!(!merged.has_next());
    }

    #[test]
    fn test_union_with_empty_side_is_identity() {
        let left = leaf(1, vec![entry("a", 1, &["u1"]), entry("b", 1, &["u2"])]);
        let right: Box<dyn IndexStream> = Box::new(ScannerStream::absent(NodeId(2)));

        let mut merged = Union::new(NodeId(9), left, right);
        let terms: Vec<Term> = std::iter::from_fn(|| merged.next().map(|(t, _)| t)).collect();
        assert_eq!(terms, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_one_side_exhausting_does_not_terminate() {
        let left = leaf(1, vec![entry("a", 1, &["u1"])]);
        let right = leaf(2, vec![entry("a", 2, &["u1"]), entry("z", 2, &["u9"])]);

        let mut merged = Union::new(NodeId(9), left, right);
        assert!(merged.next().is_some());
        let (term, _) = merged.next().unwrap();
        assert_eq!(term, "z");
        assert!(!merged.has_next());
        assert_eq!(merged.context(), StreamContext::NoDocument);
    }

    #[test]
    fn test_gating_side_poisons_union() {
        let left = leaf(1, vec![entry("a", 1, &["u1"])]);
        let right: Box<dyn IndexStream> = Box::new(ScannerStream::unindexed(NodeId(2)));

        let mut merged = Union::new(NodeId(9), left, right);
        assert_eq!(merged.context(), StreamContext::NonDistributable);
        assert!(!merged.has_next());
    }

    #[test]
    fn test_no_duplicate_terms() {
        let left = leaf(1, vec![entry("a", 1, &["u1"]), entry("b", 1, &["u2"])]);
        let right = leaf(2, vec![entry("a", 2, &["u1"]), entry("b", 2, &["u3"])]);

        let mut merged = Union::new(NodeId(9), left, right);
        let terms: Vec<Term> = std::iter::from_fn(|| merged.next().map(|(t, _)| t)).collect();
        assert_eq!(terms, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_seek_drains_both_sides() {
        let left = leaf(1, vec![entry("a", 1, &["u1"]), entry("d", 1, &["u4"])]);
        let right = leaf(2, vec![entry("b", 2, &["u2"]), entry("e", 2, &["u5"])]);

        let mut merged = Union::new(NodeId(9), left, right);
        assert_eq!(merged.seek("c"), Some("d".to_string()));
        let terms: Vec<Term> = std::iter::from_fn(|| merged.next().map(|(t, _)| t)).collect();
        assert_eq!(terms, vec!["d".to_string(), "e".to_string()]);
    }
}

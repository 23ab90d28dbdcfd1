//! Value types for the index-stream algebra
//!
//! One `IndexInfo` aggregates the candidates an index stream found for a
//! single term. Match sets are `BTreeSet`-backed for deterministic order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::query::NodeId;
use crate::uid::{Uid, UidIntersector};

/// Lexicographically sortable partition key (e.g. a shard/date bucket) used
/// as the merge key across index streams.
pub type Term = String;

/// Candidate-set cardinality for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// Exact candidate count. Equals the match-set size when uids are kept.
    Exact(u64),
    /// Too many candidates to enumerate; uids were not kept.
    Unknown,
}

impl Cardinality {
    /// Returns the exact count, if known.
    pub fn exact(&self) -> Option<u64> {
        match self {
            Cardinality::Exact(n) => Some(*n),
            Cardinality::Unknown => None,
        }
    }

    /// Returns true for the unknown/too-large sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Cardinality::Unknown)
    }

    /// The smaller of two estimates; unknown defers to any exact count.
    pub fn min(self, other: Cardinality) -> Cardinality {
        match (self, other) {
            (Cardinality::Exact(a), Cardinality::Exact(b)) => Cardinality::Exact(a.min(b)),
            (Cardinality::Exact(a), Cardinality::Unknown) => Cardinality::Exact(a),
            (Cardinality::Unknown, Cardinality::Exact(b)) => Cardinality::Exact(b),
            (Cardinality::Unknown, Cardinality::Unknown) => Cardinality::Unknown,
        }
    }

    /// Additive estimate; unknown poisons the sum.
    pub fn saturating_add(self, other: Cardinality) -> Cardinality {
        match (self, other) {
            (Cardinality::Exact(a), Cardinality::Exact(b)) => Cardinality::Exact(a.saturating_add(b)),
            _ => Cardinality::Unknown,
        }
    }
}

/// A single candidate: document uid plus the query node that produced it.
///
/// Primary order is by uid (lexicographic), tie-break by node id. Equal
/// uids under the same node collapse to one element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexMatch {
    uid: Uid,
    node: NodeId,
}

impl IndexMatch {
    /// Creates a match with its originating node.
    pub fn new(uid: Uid, node: NodeId) -> Self {
        Self { uid, node }
    }

    /// The candidate document uid.
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// The query node this match originated from.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// Per-term aggregate of candidate matches with provenance.
///
/// Invariant: `count` is `Exact(matches.len())` whenever uids are kept;
/// a count-only info has an empty match set and a non-zero (or unknown)
/// count. Streams never emit an info with no matches and a zero count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    matches: BTreeSet<IndexMatch>,
    count: Cardinality,
    node: NodeId,
}

impl IndexInfo {
    /// An info carrying explicit candidate uids.
    pub fn with_matches(node: NodeId, matches: BTreeSet<IndexMatch>) -> Self {
        let count = Cardinality::Exact(matches.len() as u64);
        Self { matches, count, node }
    }

    /// A count-only info: candidates exist but uids were not kept.
    pub fn count_only(node: NodeId, count: Cardinality) -> Self {
        Self {
            matches: BTreeSet::new(),
            count,
            node,
        }
    }

    /// Builds an info from raw uids, all attributed to `node`.
    pub fn from_uids<I>(node: NodeId, uids: I) -> Self
    where
        I: IntoIterator<Item = Uid>,
    {
        let matches = uids
            .into_iter()
            .map(|uid| IndexMatch::new(uid, node))
            .collect();
        Self::with_matches(node, matches)
    }

    /// The query node this aggregate belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Candidate count (exact or the unknown sentinel).
    pub fn count(&self) -> Cardinality {
        self.count
    }

    /// The candidate match set. Empty for count-only infos.
    pub fn matches(&self) -> &BTreeSet<IndexMatch> {
        &self.matches
    }

    /// Iterates candidate uids in ascending order.
    pub fn uids(&self) -> impl Iterator<Item = &Uid> {
        self.matches.iter().map(IndexMatch::uid)
    }

    /// Returns true when explicit uids are kept.
    pub fn has_uids(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Re-attributes this aggregate to a different query node, keeping
    /// per-match provenance intact.
    pub fn relabel(mut self, node: NodeId) -> Self {
        self.node = node;
        self
    }

    /// Combines two sides of an AND for the same term.
    ///
    /// With explicit uids on both sides the configured intersector decides;
    /// an empty combination drops the term (None). A count-only side cannot
    /// narrow the explicit side, which passes through. Two count-only sides
    /// keep the smaller estimate.
    pub fn intersect(
        &self,
        other: &IndexInfo,
        node: NodeId,
        intersector: &dyn UidIntersector,
    ) -> Option<IndexInfo> {
        match (self.has_uids(), other.has_uids()) {
            (true, true) => {
                let combined = intersector.intersect(&self.matches, &other.matches);
                if combined.is_empty() {
                    None
                } else {
                    Some(IndexInfo::with_matches(node, combined))
                }
            }
            (true, false) => Some(IndexInfo::with_matches(node, self.matches.clone())),
            (false, true) => Some(IndexInfo::with_matches(node, other.matches.clone())),
            (false, false) => Some(IndexInfo::count_only(node, self.count.min(other.count))),
        }
    }

    /// Combines two sides of an OR for the same term.
    ///
    /// Explicit uids union; any count-only side forces a count-only result
    /// whose count is an additive estimate.
    pub fn union(&self, other: &IndexInfo, node: NodeId) -> IndexInfo {
        if self.has_uids() && other.has_uids() {
            let combined = self.matches.union(&other.matches).cloned().collect();
            IndexInfo::with_matches(node, combined)
        } else {
            IndexInfo::count_only(node, self.count.saturating_add(other.count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uid::DefaultUidIntersector;

    fn uid(raw: &str) -> Uid {
        Uid::parse(raw).unwrap()
    }

    fn info(node: u32, uids: &[&str]) -> IndexInfo {
        IndexInfo::from_uids(NodeId(node), uids.iter().map(|u| uid(u)))
    }

    #[test]
    fn test_match_ordering_uid_first() {
        let a = IndexMatch::new(uid("abc"), NodeId(9));
        let b = IndexMatch::new(uid("abd"), NodeId(1));
        assert!(a < b);

        let c = IndexMatch::new(uid("abc"), NodeId(1));
        assert!(c < a); // same uid, lower node id first
    }

    #[test]
    fn test_count_matches_size() {
        let i = info(1, &["u1", "u2", "u3"]);
        assert_eq!(i.count(), Cardinality::Exact(3));
        assert!(i.has_uids());
    }

    #[test]
    fn test_count_only_has_no_uids() {
        let i = IndexInfo::count_only(NodeId(1), Cardinality::Unknown);
        assert!(!i.has_uids());
        assert!(i.count().is_unknown());
    }

    #[test]
    fn test_intersect_disjoint_drops_term() {
        let l = info(1, &["u1"]);
        let r = info(2, &["u2"]);
        assert!(l.intersect(&r, NodeId(3), &DefaultUidIntersector).is_none());
    }

    #[test]
    fn test_intersect_count_only_keeps_explicit_side() {
        let explicit = info(1, &["u1", "u2"]);
        let shard = IndexInfo::count_only(NodeId(2), Cardinality::Unknown);

        let combined = explicit
            .intersect(&shard, NodeId(3), &DefaultUidIntersector)
            .unwrap();
        assert_eq!(combined.uids().map(Uid::as_str).collect::<Vec<_>>(), vec!["u1", "u2"]);
        assert_eq!(combined.node(), NodeId(3));

        let flipped = shard
            .intersect(&explicit, NodeId(3), &DefaultUidIntersector)
            .unwrap();
        assert_eq!(flipped.count(), Cardinality::Exact(2));
    }

    #[test]
    fn test_intersect_two_count_only_keeps_smaller_estimate() {
        let a = IndexInfo::count_only(NodeId(1), Cardinality::Exact(10));
        let b = IndexInfo::count_only(NodeId(2), Cardinality::Unknown);
        let combined = a.intersect(&b, NodeId(3), &DefaultUidIntersector).unwrap();
        assert_eq!(combined.count(), Cardinality::Exact(10));
    }

    #[test]
    fn test_union_merges_uids() {
        let l = info(1, &["u1"]);
        let r = info(2, &["u2"]);
        let combined = l.union(&r, NodeId(3));
        assert_eq!(combined.count(), Cardinality::Exact(2));
        assert_eq!(combined.uids().map(Uid::as_str).collect::<Vec<_>>(), vec!["u1", "u2"]);
    }

    #[test]
    fn test_union_count_only_poisons() {
        let l = info(1, &["u1"]);
        let r = IndexInfo::count_only(NodeId(2), Cardinality::Exact(5));
        let combined = l.union(&r, NodeId(3));
        assert!(!combined.has_uids());
        assert_eq!(combined.count(), Cardinality::Exact(6));

        let unknown = IndexInfo::count_only(NodeId(2), Cardinality::Unknown);
        assert!(l.union(&unknown, NodeId(3)).count().is_unknown());
    }

    #[test]
    fn test_equal_uid_same_node_collapses() {
        let i = IndexInfo::from_uids(NodeId(1), vec![uid("abc"), uid("abc")]);
        assert_eq!(i.count(), Cardinality::Exact(1));
    }
}

//! Stream state classification
//!
//! Every stream reports a context describing how (or whether) it can
//! contribute candidates. Composite streams recompute their context lazily
//! from their children on each call; classification degrades to
//! `NoDocument` once iteration proves a data-bearing stream empty.

use serde::{Deserialize, Serialize};

/// Classification of a stream's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamContext {
    /// The stream has no further candidate documents.
    NoDocument,
    /// The predicate cannot be evaluated against the index; it gates an
    /// intersection without filtering candidates.
    NonDistributable,
    /// The field and value have data in the index, but some terms are
    /// count-only, so candidates distribute as whole-shard ranges.
    Present,
    /// Data was expected in the index and none was found.
    Absent,
    /// The field is not indexed at all.
    Unindexed,
    /// Every emitted term carries explicit document uids, so candidates
    /// distribute as per-document ranges.
    Distributable,
}

impl StreamContext {
    /// Contexts that gate an intersection without narrowing it.
    pub fn is_gating(&self) -> bool {
        matches!(self, StreamContext::NonDistributable | StreamContext::Unindexed)
    }

    /// Contexts that can still produce candidates.
    pub fn has_data(&self) -> bool {
        matches!(self, StreamContext::Present | StreamContext::Distributable)
    }

    /// Combined context of an intersection's two children.
    ///
    /// An absent side empties the conjunction. A gating side defers to the
    /// other side. Explicit uids survive intersection with a count-only
    /// side, so one distributable side makes the result distributable.
    pub fn for_intersection(left: Self, right: Self) -> Self {
        use StreamContext::*;
        match (left, right) {
            (Absent, _) | (_, Absent) => Absent,
            (l, r) if l.is_gating() && r.is_gating() => NonDistributable,
            (l, r) if l.is_gating() => r,
            (l, r) if r.is_gating() => l,
            (NoDocument, _) | (_, NoDocument) => NoDocument,
            (Distributable, _) | (_, Distributable) => Distributable,
            _ => Present,
        }
    }

    /// Combined context of a union's two children.
    ///
    /// A union containing a term that cannot be evaluated by index cannot
    /// be narrowed by index at all. An absent or exhausted side defers to
    /// the other side.
    pub fn for_union(left: Self, right: Self) -> Self {
        use StreamContext::*;
        match (left, right) {
            (l, r) if l.is_gating() || r.is_gating() => NonDistributable,
            (Absent, Absent) => Absent,
            (NoDocument, NoDocument) => NoDocument,
            (Absent, other) | (other, Absent) => other,
            (NoDocument, other) | (other, NoDocument) => other,
            (Distributable, Distributable) => Distributable,
            _ => Present,
        }
    }
}

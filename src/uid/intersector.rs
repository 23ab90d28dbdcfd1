//! Pluggable uid combination policies for AND evaluation
//!
//! An intersector decides which candidates satisfy both sides of a
//! conjunction for one term. The default policy requires exact uid
//! equality; the ancestor-aware policy also accepts ancestor/descendant
//! pairs because fields are inherited down the document hierarchy.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Bound;

use crate::stream::IndexMatch;

use super::Uid;

/// Strategy for combining the match sets of an AND's two sides.
pub trait UidIntersector: fmt::Debug {
    /// Produces the combined set satisfying both sides. An empty result
    /// means the term is dropped from the merged stream.
    fn intersect(
        &self,
        left: &BTreeSet<IndexMatch>,
        right: &BTreeSet<IndexMatch>,
    ) -> BTreeSet<IndexMatch>;
}

/// Keeps a candidate only when the exact uid appears on both sides.
/// Surviving matches retain their own node provenance from either side.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUidIntersector;

impl UidIntersector for DefaultUidIntersector {
    fn intersect(
        &self,
        left: &BTreeSet<IndexMatch>,
        right: &BTreeSet<IndexMatch>,
    ) -> BTreeSet<IndexMatch> {
        let left_uids: BTreeSet<&Uid> = left.iter().map(IndexMatch::uid).collect();
        let right_uids: BTreeSet<&Uid> = right.iter().map(IndexMatch::uid).collect();

        left.iter()
            .filter(|m| right_uids.contains(m.uid()))
            .chain(right.iter().filter(|m| left_uids.contains(m.uid())))
            .cloned()
            .collect()
    }
}

/// Accepts exact uid matches plus ancestor/descendant pairs in either
/// direction. Both members of an accepted pair survive with their own
/// provenance; same-node redundancy is collapsed later by the overlap
/// remover.
#[derive(Debug, Clone, Copy, Default)]
pub struct AncestorUidIntersector;

impl AncestorUidIntersector {
    /// True when `uid` equals, descends from, or is an ancestor of some uid
    /// on the other side.
    fn related(uid: &Uid, other_side: &BTreeSet<Uid>) -> bool {
        if other_side.contains(uid) {
            return true;
        }
        if uid.ancestors().any(|a| other_side.contains(&a)) {
            return true;
        }
        // Any descendant of `uid` on the other side lies in the key range
        // (uid + ".", uid + "/"): '/' is the first code point after the
        // separator, so the range covers exactly the strings extending uid
        // past a separator.
        let lower = format!("{}.", uid.as_str());
        let upper = format!("{}/", uid.as_str());
        other_side
            .range::<str, _>((Bound::Excluded(lower.as_str()), Bound::Excluded(upper.as_str())))
            .next()
            .is_some()
    }
}

impl UidIntersector for AncestorUidIntersector {
    fn intersect(
        &self,
        left: &BTreeSet<IndexMatch>,
        right: &BTreeSet<IndexMatch>,
    ) -> BTreeSet<IndexMatch> {
        let left_uids: BTreeSet<Uid> = left.iter().map(|m| m.uid().clone()).collect();
        let right_uids: BTreeSet<Uid> = right.iter().map(|m| m.uid().clone()).collect();

        left.iter()
            .filter(|m| Self::related(m.uid(), &right_uids))
            .chain(right.iter().filter(|m| Self::related(m.uid(), &left_uids)))
            .cloned()
            .collect()
    }
}

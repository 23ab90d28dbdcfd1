//! Ancestor overlap removal
//!
//! Ancestor-aware intersection can leave both an ancestor uid and its
//! descendants in one term's match set when they originate from the same
//! query node, double-reporting one document family. The remover keeps the
//! highest ancestor per node-group and discards its descendants. Matches
//! from different nodes never suppress each other.

use std::collections::{BTreeMap, BTreeSet};

use crate::query::NodeId;
use crate::stream::{IndexInfo, IndexMatch, IndexStream, StreamContext, Term};

use super::Uid;

/// Removes redundant ancestor/descendant duplicates sharing an originating
/// node. Idempotent; a no-op on empty, singleton, and count-only infos.
pub fn remove_overlapping(info: IndexInfo) -> IndexInfo {
    if info.matches().len() < 2 {
        return info;
    }

    let mut grouped: BTreeMap<NodeId, Vec<IndexMatch>> = BTreeMap::new();
    for m in info.matches() {
        grouped.entry(m.node()).or_default().push(m.clone());
    }

    let mut kept: BTreeSet<IndexMatch> = BTreeSet::new();
    for group in grouped.into_values() {
        // The match set is uid-ascending, so each group arrives with
        // ancestors ahead of their descendants.
        let mut kept_uids: BTreeSet<Uid> = BTreeSet::new();
        for m in group {
            let redundant = m.uid().ancestors().any(|a| kept_uids.contains(&a));
            if !redundant {
                kept_uids.insert(m.uid().clone());
                kept.insert(m);
            }
        }
    }

    IndexInfo::with_matches(info.node(), kept)
}

/// Transparent stream wrapper applying `remove_overlapping` to every
/// emitted element. Context, provenance, and seek delegate to the wrapped
/// stream.
pub struct AncestorOverlapStream {
    delegate: Box<dyn IndexStream>,
    lookahead: Option<(Term, IndexInfo)>,
}

impl AncestorOverlapStream {
    /// Wraps a merged stream in ancestor overlap removal.
    pub fn new(delegate: Box<dyn IndexStream>) -> Self {
        Self {
            delegate,
            lookahead: None,
        }
    }

    fn fill(&mut self) {
        if self.lookahead.is_none() {
            if let Some((term, info)) = self.delegate.next() {
                self.lookahead = Some((term, remove_overlapping(info)));
            }
        }
    }
}

impl IndexStream for AncestorOverlapStream {
    fn context(&self) -> StreamContext {
        if let Some((_, info)) = &self.lookahead {
            if info.has_uids() {
                return StreamContext::Distributable;
            }
            return StreamContext::Present;
        }
        self.delegate.context()
    }

    fn node(&self) -> NodeId {
        self.delegate.node()
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
        self.delegate.seek(target)?;
        self.fill();
        self.lookahead.as_ref().map(|(term, _)| term.clone())
    }
}

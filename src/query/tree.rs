//! Boolean expression tree handed in by the query planner
//!
//! The planner parses and validates the query language; by the time a tree
//! reaches this crate, every leaf predicate has been resolved to an index
//! stream producer. Node identities are assigned by the planner and flow
//! through the algebra as match provenance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stream::IndexStream;

/// Identity of a node in the planner's boolean tree.
///
/// The core never invents identities; provenance on matches refers back to
/// these ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How document uids relate across the hierarchy for this scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HierarchyMode {
    /// Uids combine only on exact equality.
    #[default]
    Flat,
    /// Fields are inherited down the hierarchy: a match on a child
    /// sub-document and a match on its ancestor attribute to the same
    /// document family.
    Ancestor,
}

/// A resolved boolean tree: leaves carry index stream producers, interior
/// nodes mirror the AND/OR structure of the parsed query.
pub enum QueryTree {
    /// A leaf predicate already resolved against the global index.
    Leaf(Box<dyn IndexStream>),
    /// Conjunction of children.
    And {
        node: NodeId,
        children: Vec<QueryTree>,
    },
    /// Disjunction of children.
    Or {
        node: NodeId,
        children: Vec<QueryTree>,
    },
}

impl QueryTree {
    /// Convenience constructor for a conjunction.
    pub fn and(node: NodeId, children: Vec<QueryTree>) -> Self {
        QueryTree::And { node, children }
    }

    /// Convenience constructor for a disjunction.
    pub fn or(node: NodeId, children: Vec<QueryTree>) -> Self {
        QueryTree::Or { node, children }
    }
}

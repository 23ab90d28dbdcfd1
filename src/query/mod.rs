//! Boolean query structure and stream assembly
//!
//! The upstream planner parses and validates the query language and
//! resolves every leaf predicate to an index stream. This module carries
//! that resolved tree and mirrors its AND/OR structure into the merge
//! combinators.

mod builder;
mod tree;

pub use builder::combine;
pub use tree::{HierarchyMode, NodeId, QueryTree};

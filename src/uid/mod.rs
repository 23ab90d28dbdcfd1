//! Hierarchical document identifiers and family-aware combination
//!
//! Uids encode parent/child document relationships as
//! `<parent>[.<child>]*`. This module owns the validated `Uid` type, the
//! pluggable intersection policies that decide when two sides of an AND
//! agree on a candidate, and the overlap remover that collapses redundant
//! ancestor/descendant duplicates within one query node's matches.
//!
//! # Invariants
//!
//! - `.` is reserved as the hierarchy separator; segments are non-empty
//! - Ancestors sort before their descendants (lexicographic uid order)
//! - After overlap removal, no two matches from the same node are in an
//!   ancestor/descendant relation

mod errors;
mod hierarchy;
mod intersector;
mod overlap;

pub use errors::{HierarchyError, HierarchyResult};
pub use hierarchy::{Ancestors, Uid, HIERARCHY_SEPARATOR};
pub use intersector::{AncestorUidIntersector, DefaultUidIntersector, UidIntersector};
pub use overlap::{remove_overlapping, AncestorOverlapStream};

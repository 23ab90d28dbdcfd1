//! Stream Algebra Tests
//!
//! Merge properties of the Intersection and Union combinators:
//! - Outputs are strictly term-ascending with no duplicate terms
//! - Intersection(A, A) == A
//! - Union(A, empty) == A
//! - Exhaustion and gating semantics

use std::sync::Arc;

use shardscan::query::NodeId;
use shardscan::stream::{
    Cardinality, IndexInfo, IndexStream, Intersection, ScannerStream, StreamContext, Term, Union,
};
use shardscan::uid::{DefaultUidIntersector, Uid};

// =============================================================================
// Helper Functions
// =============================================================================

fn entry(term: &str, node: u32, uids: &[&str]) -> (Term, IndexInfo) {
    (
        term.to_string(),
        IndexInfo::from_uids(NodeId(node), uids.iter().map(|u| Uid::parse(*u).unwrap())),
    )
}

fn leaf(node: u32, entries: Vec<(Term, IndexInfo)>) -> Box<dyn IndexStream> {
    Box::new(ScannerStream::with_data(NodeId(node), entries))
}

fn intersect(left: Box<dyn IndexStream>, right: Box<dyn IndexStream>) -> Box<dyn IndexStream> {
    Box::new(Intersection::new(
        NodeId(100),
        left,
        right,
        Arc::new(DefaultUidIntersector),
    ))
}

fn union(left: Box<dyn IndexStream>, right: Box<dyn IndexStream>) -> Box<dyn IndexStream> {
    Box::new(Union::new(NodeId(100), left, right))
}

fn drain(stream: &mut Box<dyn IndexStream>) -> Vec<(Term, Vec<String>)> {
    std::iter::from_fn(|| {
        stream
            .next()
            .map(|(term, info)| (term, info.uids().map(Uid::to_string).collect()))
    })
    .collect()
}

// =============================================================================
// Ordering Properties
// =============================================================================

/// Intersection output is strictly ascending with no duplicate terms.
#[test]
fn test_intersection_strictly_ascending() {
    let left = leaf(
        1,
        vec![
            entry("a", 1, &["u1"]),
            entry("b", 1, &["u1"]),
            entry("c", 1, &["u1"]),
            entry("e", 1, &["u1"]),
        ],
    );
    let right = leaf(
        2,
        vec![
            entry("b", 2, &["u1"]),
            entry("c", 2, &["u1"]),
            entry("d", 2, &["u1"]),
            entry("e", 2, &["u1"]),
        ],
    );

    let mut merged = intersect(left, right);
    let terms: Vec<Term> = drain(&mut merged).into_iter().map(|(t, _)| t).collect();
    assert_eq!(terms, vec!["b", "c", "e"]);
    assert!(terms.windows(2).all(|w| w[0] < w[1]));
}

/// Union output is strictly ascending with no duplicate terms.
#[test]
fn test_union_strictly_ascending() {
    let left = leaf(1, vec![entry("a", 1, &["u1"]), entry("c", 1, &["u2"])]);
    let right = leaf(2, vec![entry("b", 2, &["u3"]), entry("c", 2, &["u4"])]);

    let mut merged = union(left, right);
    let terms: Vec<Term> = drain(&mut merged).into_iter().map(|(t, _)| t).collect();
    assert_eq!(terms, vec!["a", "b", "c"]);
    assert!(terms.windows(2).all(|w| w[0] < w[1]));
}

// =============================================================================
// Identity Properties
// =============================================================================

/// Intersection of a stream with itself is content-identical to the stream.
#[test]
fn test_intersection_self_identity() {
    let make = || {
        leaf(
            1,
            vec![
                entry("a", 1, &["u1", "u2"]),
                entry("b", 1, &["u3"]),
                entry("c", 1, &["u4", "u5", "u6"]),
            ],
        )
    };

    let mut merged = intersect(make(), make());
    let mut reference = make();

    let merged_content = drain(&mut merged);
    let reference_content = drain(&mut reference);
    assert_eq!(merged_content, reference_content);
}

/// Union with an empty stream passes the other side through unchanged.
#[test]
fn test_union_empty_identity() {
    let make = || {
        leaf(
            1,
            vec![entry("a", 1, &["u1"]), entry("b", 1, &["u2", "u3"])],
        )
    };
    let empty: Box<dyn IndexStream> = Box::new(ScannerStream::absent(NodeId(2)));

    let mut merged = union(make(), empty);
    let mut reference = make();
    assert_eq!(drain(&mut merged), drain(&mut reference));
}

// =============================================================================
// End-to-End Spec Scenario
// =============================================================================

/// Two terms with disjoint uid sets on each side intersect to an empty
/// stream: no terms are emitted at all.
#[test]
fn test_disjoint_uid_sets_empty_intersection() {
    let left = leaf(
        1,
        vec![entry("2024010100", 1, &["u1"]), entry("2024010200", 1, &["u1"])],
    );
    let right = leaf(
        2,
        vec![entry("2024010100", 2, &["u2"]), entry("2024010200", 2, &["u2"])],
    );

    let mut merged = intersect(left, right);
    assert!(!merged.has_next());
    assert!(drain(&mut merged).is_empty());
    assert_eq!(merged.context(), StreamContext::NoDocument);
}

// =============================================================================
// Exhaustion & Gating
// =============================================================================

/// AND of "nothing more" is "nothing more": one exhausted side terminates.
#[test]
fn test_intersection_terminates_with_either_side() {
    let left = leaf(1, vec![entry("a", 1, &["u1"])]);
    let right = leaf(
        2,
        vec![entry("a", 2, &["u1"]), entry("b", 2, &["u1"]), entry("c", 2, &["u1"])],
    );

    let mut merged = intersect(left, right);
    assert_eq!(drain(&mut merged).len(), 1);
}

/// One exhausted side does not terminate a union.
#[test]
fn test_union_drains_surviving_side() {
    let left = leaf(1, vec![entry("a", 1, &["u1"])]);
    let right = leaf(
        2,
        vec![entry("a", 2, &["u2"]), entry("b", 2, &["u3"]), entry("c", 2, &["u4"])],
    );

    let mut merged = union(left, right);
    let terms: Vec<Term> = drain(&mut merged).into_iter().map(|(t, _)| t).collect();
    assert_eq!(terms, vec!["a", "b", "c"]);
}

/// A non-distributable side gates an intersection without filtering it.
#[test]
fn test_non_distributable_side_gates_intersection() {
    let data = leaf(1, vec![entry("a", 1, &["u1"]), entry("b", 1, &["u2"])]);
    let gated: Box<dyn IndexStream> = Box::new(ScannerStream::non_distributable(NodeId(2)));

    let mut merged = intersect(data, gated);
    let content = drain(&mut merged);
    assert_eq!(content.len(), 2);
    assert_eq!(content[0].1, vec!["u1"]);
}

// =============================================================================
// Count-Only Terms
// =============================================================================

/// Intersecting a count-only term with explicit uids keeps the uids.
#[test]
fn test_count_only_intersects_to_explicit_uids() {
    let explicit = leaf(1, vec![entry("a", 1, &["u1", "u2"])]);
    let counted = leaf(
        2,
        vec![(
            "a".to_string(),
            IndexInfo::count_only(NodeId(2), Cardinality::Unknown),
        )],
    );

    let mut merged = intersect(explicit, counted);
    let content = drain(&mut merged);
    assert_eq!(content, vec![("a".to_string(), vec!["u1".to_string(), "u2".to_string()])]);
}

/// Seek lands every stream type on the first term at or past the target.
#[test]
fn test_seek_through_combinators() {
    let left = leaf(
        1,
        vec![entry("a", 1, &["u1"]), entry("c", 1, &["u1"]), entry("e", 1, &["u1"])],
    );
    let right = leaf(
        2,
        vec![entry("a", 2, &["u1"]), entry("c", 2, &["u1"]), entry("e", 2, &["u1"])],
    );

    let mut merged = intersect(left, right);
    assert_eq!(merged.seek("b"), Some("c".to_string()));

    let remaining: Vec<Term> = drain(&mut merged).into_iter().map(|(t, _)| t).collect();
    assert_eq!(remaining, vec!["c", "e"]);
}

//! Combinator assembly mirroring the boolean tree
//!
//! Interior AND/OR nodes become nested Intersection/Union combinators.
//! Ancestor mode swaps in the ancestor-aware uid intersector and wraps the
//! merged stream so same-node ancestor/descendant duplicates are removed
//! before candidates reach the document pipeline.

use std::sync::Arc;

use crate::stream::{IndexStream, Intersection, ScannerStream, Union};
use crate::uid::{AncestorOverlapStream, AncestorUidIntersector, DefaultUidIntersector, UidIntersector};

use super::{HierarchyMode, NodeId, QueryTree};

/// Builds the merged index stream for a resolved boolean tree.
pub fn combine(tree: QueryTree, mode: HierarchyMode) -> Box<dyn IndexStream> {
    let intersector: Arc<dyn UidIntersector> = match mode {
        HierarchyMode::Flat => Arc::new(DefaultUidIntersector),
        HierarchyMode::Ancestor => Arc::new(AncestorUidIntersector),
    };

    let stream = build(tree, &intersector);
    match mode {
        HierarchyMode::Flat => stream,
        HierarchyMode::Ancestor => Box::new(AncestorOverlapStream::new(stream)),
    }
}

fn build(tree: QueryTree, intersector: &Arc<dyn UidIntersector>) -> Box<dyn IndexStream> {
    match tree {
        QueryTree::Leaf(stream) => stream,
        QueryTree::And { node, children } => {
            fold_junction(node, children, intersector, |node, left, right| {
                Box::new(Intersection::new(node, left, right, Arc::clone(intersector)))
            })
        }
        QueryTree::Or { node, children } => {
            fold_junction(node, children, intersector, |node, left, right| {
                Box::new(Union::new(node, left, right))
            })
        }
    }
}

/// Folds a junction's children left-associatively into nested binary
/// combinators. A single child propagates up unchanged; an empty junction
/// is degenerate and resolves to an absent stream.
fn fold_junction<F>(
    node: NodeId,
    children: Vec<QueryTree>,
    intersector: &Arc<dyn UidIntersector>,
    join: F,
) -> Box<dyn IndexStream>
where
    F: Fn(NodeId, Box<dyn IndexStream>, Box<dyn IndexStream>) -> Box<dyn IndexStream>,
{
    let mut built = children.into_iter().map(|child| build(child, intersector));
    match built.next() {
        None => Box::new(ScannerStream::absent(node)),
        Some(first) => built.fold(first, |acc, next| join(node, acc, next)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{IndexInfo, StreamContext, Term};
    use crate::uid::Uid;

    fn leaf(node: u32, entries: &[(&str, &[&str])]) -> QueryTree {
        let entries: Vec<(Term, IndexInfo)> = entries
            .iter()
            .map(|(term, uids)| {
                (
                    term.to_string(),
                    IndexInfo::from_uids(NodeId(node), uids.iter().map(|u| Uid::parse(*u).unwrap())),
                )
            })
            .collect();
        QueryTree::Leaf(Box::new(ScannerStream::with_data(NodeId(node), entries)))
    }

    #[test]
    fn test_and_of_disjoint_sides_is_empty() {
        let tree = QueryTree::and(
            NodeId(0),
            vec![
                leaf(1, &[("2024010100", &["u1"]), ("2024010200", &["u1"])]),
                leaf(2, &[("2024010100", &["u2"]), ("2024010200", &["u2"])]),
            ],
        );
        let mut stream = combine(tree, HierarchyMode::Flat);
        assert!(!stream.has_next());
    }

    #[test]
    fn test_nested_or_under_and() {
        let tree = QueryTree::and(
            NodeId(0),
            vec![
                leaf(1, &[("a", &["u1"]), ("b", &["u2"])]),
                QueryTree::or(
                    NodeId(2),
                    vec![leaf(3, &[("a", &["u1"])]), leaf(4, &[("b", &["u2"])])],
                ),
            ],
        );
        let mut stream = combine(tree, HierarchyMode::Flat);
        let terms: Vec<Term> = std::iter::from_fn(|| stream.next().map(|(t, _)| t)).collect();
        assert_eq!(terms, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_single_child_junction_propagates() {
        let tree = QueryTree::and(NodeId(0), vec![leaf(1, &[("a", &["u1"])])]);
        let mut stream = combine(tree, HierarchyMode::Flat);
        assert!(stream.has_next());
        assert_eq!(stream.node(), NodeId(1));
    }

    #[test]
    fn test_empty_junction_is_absent() {
        let tree = QueryTree::or(NodeId(0), vec![]);
        let stream = combine(tree, HierarchyMode::Flat);
        assert_eq!(stream.context(), StreamContext::Absent);
    }

    #[test]
    fn test_ancestor_mode_accepts_family_and_dedups() {
        // Node 1 matched the parent, node 2 matched a child; ancestor mode
        // attributes both to the same family and reports it once per node.
        let tree = QueryTree::and(
            NodeId(0),
            vec![
                leaf(1, &[("a", &["abc", "abc.1"])]),
                leaf(2, &[("a", &["abc.2"])]),
            ],
        );
        let mut stream = combine(tree, HierarchyMode::Ancestor);
        let (term, info) = stream.next().unwrap();
        assert_eq!(term, "a");
        let uids: Vec<String> = info.uids().map(Uid::to_string).collect();
        assert_eq!(uids, vec!["abc".to_string(), "abc.2".to_string()]);
        assert!(!stream.has_next());
    }

    #[test]
    fn test_flat_mode_rejects_family_pair() {
        let tree = QueryTree::and(
            NodeId(0),
            vec![leaf(1, &[("a", &["abc"])]), leaf(2, &[("a", &["abc.1"])])],
        );
        let mut stream = combine(tree, HierarchyMode::Flat);
        assert!(!stream.has_next());
    }
}

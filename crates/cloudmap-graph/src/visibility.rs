//! Visibility reduction.
//!
//! Turns the static dataset plus the current collapse flags into the list of
//! nodes and edges that should be drawn. Collapsed nodes stay visible but
//! their whole subtree is cut off.

use cloudmap_core::{
    CloudNode, CollapseSet, CountFilter, Dataset, EdgeId, NodeId, NodeType, TopologyError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleNode {
    pub id: NodeId,
    pub label: String,
    pub node_type: NodeType,
    pub alerts: u32,
    pub misconfigs: u32,
    pub collapsed: bool,
    pub has_children: bool,
    /// Number of direct children in the dataset, visible or not.
    pub child_count: usize,
    pub filter: CountFilter,
}

impl VisibleNode {
    fn project(node: &CloudNode, collapsed: bool, filter: CountFilter) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            node_type: node.node_type.clone(),
            alerts: node.alerts,
            misconfigs: node.misconfigs,
            collapsed,
            has_children: node.has_children(),
            child_count: node.children.len(),
            filter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibleEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl VisibleEdge {
    pub fn new(source: &NodeId, target: &NodeId) -> Self {
        Self {
            id: EdgeId::between(source, target),
            source: source.clone(),
            target: target.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleGraph {
    pub nodes: Vec<VisibleNode>,
    pub edges: Vec<VisibleEdge>,
}

impl VisibleGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|node| &node.id == id)
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.iter().any(|edge| &edge.id == id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&VisibleNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn node_ids(&self) -> Vec<&NodeId> {
        self.nodes.iter().map(|node| &node.id).collect()
    }

    pub fn edge_ids(&self) -> Vec<&EdgeId> {
        self.edges.iter().map(|edge| &edge.id).collect()
    }
}

struct Visit<'a> {
    parent: Option<&'a NodeId>,
    id: &'a NodeId,
}

/// Computes the visible subset of `dataset` for the given collapse flags.
///
/// Traversal is depth-first from the dataset root. Output order is preorder
/// with children in list order, so layouts and snapshots are deterministic.
/// A child id missing from the dataset fails the pass only once the
/// traversal actually reaches it.
pub fn reduce(
    dataset: &Dataset,
    collapsed: &CollapseSet,
    filter: CountFilter,
) -> Result<VisibleGraph, TopologyError> {
    let root = dataset.root();
    if !dataset.contains(root) {
        return Err(TopologyError::NotFound(root.clone()));
    }

    let mut graph = VisibleGraph::default();
    let mut visited: HashSet<&NodeId> = HashSet::with_capacity(dataset.len());
    let mut stack = vec![Visit {
        parent: None,
        id: root,
    }];

    while let Some(Visit { parent, id }) = stack.pop() {
        if let Some(parent) = parent {
            graph.edges.push(VisibleEdge::new(parent, id));
        }

        if !visited.insert(id) {
            tracing::warn!("Node {} reached twice during traversal, skipping", id);
            continue;
        }

        let node = dataset
            .get(id)
            .ok_or_else(|| TopologyError::DanglingReference {
                parent: parent.cloned().unwrap_or_else(|| root.clone()),
                child: id.clone(),
            })?;

        let is_collapsed = collapsed.is_collapsed(id);
        graph
            .nodes
            .push(VisibleNode::project(node, is_collapsed, filter));

        if is_collapsed {
            continue;
        }

        // Reverse push keeps list order on pop.
        for child in node.children.iter().rev() {
            stack.push(Visit {
                parent: Some(&node.id),
                id: child,
            });
        }
    }

    tracing::debug!(
        "Reduced {} dataset nodes to {} visible nodes and {} edges",
        dataset.len(),
        graph.nodes.len(),
        graph.edges.len()
    );

    Ok(graph)
}

/// Every node below `id`, ignoring collapse state, in preorder.
///
/// Missing children are skipped here; `reduce` is the place that reports them.
pub fn descendants(dataset: &Dataset, id: &NodeId) -> Result<Vec<NodeId>, TopologyError> {
    let node = dataset
        .get(id)
        .ok_or_else(|| TopologyError::NotFound(id.clone()))?;

    let mut result = Vec::new();
    let mut visited: HashSet<&NodeId> = HashSet::new();
    visited.insert(&node.id);
    let mut stack: Vec<&NodeId> = node.children.iter().rev().collect();

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        let Some(child) = dataset.get(current) else {
            continue;
        };
        result.push(child.id.clone());
        stack.extend(child.children.iter().rev());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(id: &str, children: &[&str]) -> CloudNode {
        CloudNode::new(id, id, NodeType::Service).with_children(children.iter().copied())
    }

    fn sample() -> Dataset {
        Dataset::new(
            "root",
            vec![
                node("root", &["A", "B"]),
                node("A", &["A1", "A2"]),
                node("B", &[]),
                node("A1", &[]),
                node("A2", &[]),
            ],
        )
    }

    fn ids(graph: &VisibleGraph) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn edge_ids(graph: &VisibleGraph) -> Vec<&str> {
        graph.edges.iter().map(|e| e.id.0.as_str()).collect()
    }

    #[test]
    fn test_all_expanded() {
        let graph = reduce(&sample(), &CollapseSet::new(), CountFilter::All).unwrap();

        assert_eq!(ids(&graph), vec!["root", "A", "A1", "A2", "B"]);
        assert_eq!(edge_ids(&graph), vec!["root-A", "A-A1", "A-A2", "root-B"]);
    }

    #[test]
    fn test_collapsing_hides_subtree() {
        let collapsed: CollapseSet = [NodeId::from("A")].into_iter().collect();
        let graph = reduce(&sample(), &collapsed, CountFilter::All).unwrap();

        assert_eq!(ids(&graph), vec!["root", "A", "B"]);
        assert_eq!(edge_ids(&graph), vec!["root-A", "root-B"]);

        let a = graph.node(&NodeId::from("A")).unwrap();
        assert!(a.collapsed);
        assert!(a.has_children);
        assert_eq!(a.child_count, 2);
    }

    #[test]
    fn test_collapsed_root_shows_only_root() {
        let collapsed: CollapseSet = [NodeId::from("root")].into_iter().collect();
        let graph = reduce(&sample(), &collapsed, CountFilter::All).unwrap();

        assert_eq!(ids(&graph), vec!["root"]);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_filter_is_carried_on_every_node() {
        let graph = reduce(&sample(), &CollapseSet::new(), CountFilter::Alerts).unwrap();
        assert!(graph.nodes.iter().all(|n| n.filter == CountFilter::Alerts));
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let dataset = Dataset::new("nowhere", vec![node("root", &[])]);
        let err = reduce(&dataset, &CollapseSet::new(), CountFilter::All).unwrap_err();
        assert_eq!(err, TopologyError::NotFound(NodeId::from("nowhere")));
    }

    #[test]
    fn test_empty_dataset_is_not_found() {
        let dataset = Dataset::new("root", Vec::new());
        let err = reduce(&dataset, &CollapseSet::new(), CountFilter::All).unwrap_err();
        assert!(matches!(err, TopologyError::NotFound(_)));
    }

    #[test]
    fn test_dangling_child_is_reported_when_reached() {
        let dataset = Dataset::new(
            "root",
            vec![node("root", &["A"]), node("A", &["ghost"])],
        );

        let err = reduce(&dataset, &CollapseSet::new(), CountFilter::All).unwrap_err();
        assert_eq!(
            err,
            TopologyError::DanglingReference {
                parent: NodeId::from("A"),
                child: NodeId::from("ghost"),
            }
        );

        // Not reached while its parent is collapsed.
        let collapsed: CollapseSet = [NodeId::from("A")].into_iter().collect();
        let graph = reduce(&dataset, &collapsed, CountFilter::All).unwrap();
        assert_eq!(ids(&graph), vec!["root", "A"]);
    }

    #[test]
    fn test_shared_child_is_visited_once() {
        let dataset = Dataset::new(
            "root",
            vec![
                node("root", &["A", "B"]),
                node("A", &["shared"]),
                node("B", &["shared"]),
                node("shared", &[]),
            ],
        );

        let graph = reduce(&dataset, &CollapseSet::new(), CountFilter::All).unwrap();
        assert_eq!(ids(&graph), vec!["root", "A", "shared", "B"]);
        assert!(graph.contains_edge(&EdgeId::between(
            &NodeId::from("B"),
            &NodeId::from("shared")
        )));
    }

    #[test]
    fn test_cycle_terminates() {
        let dataset = Dataset::new(
            "root",
            vec![node("root", &["A"]), node("A", &["root"])],
        );
        let graph = reduce(&dataset, &CollapseSet::new(), CountFilter::All).unwrap();
        assert_eq!(ids(&graph), vec!["root", "A"]);
    }

    #[test]
    fn test_descendants_ignore_collapse_state() {
        let all = descendants(&sample(), &NodeId::from("root")).unwrap();
        let all: Vec<&str> = all.iter().map(NodeId::as_str).collect();
        assert_eq!(all, vec!["A", "A1", "A2", "B"]);

        assert!(descendants(&sample(), &NodeId::from("B")).unwrap().is_empty());
        assert!(descendants(&sample(), &NodeId::from("nope")).is_err());
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let depth = 50_000;
        let mut nodes = Vec::with_capacity(depth);
        for i in 0..depth {
            let children: Vec<String> = if i + 1 < depth {
                vec![format!("n{}", i + 1)]
            } else {
                Vec::new()
            };
            nodes.push(
                CloudNode::new(format!("n{i}"), format!("n{i}"), NodeType::Service)
                    .with_children(children),
            );
        }
        let dataset = Dataset::new("n0", nodes);

        let graph = reduce(&dataset, &CollapseSet::new(), CountFilter::All).unwrap();
        assert_eq!(graph.nodes.len(), depth);
        assert_eq!(graph.edges.len(), depth - 1);
    }

    // ========================================================================
    // Property-Based Tests
    // ========================================================================

    /// A random tree: node `i > 0` hangs under a parent with a smaller index.
    fn tree_strategy() -> impl Strategy<Value = (Dataset, CollapseSet)> {
        (1usize..40)
            .prop_flat_map(|n| {
                let parents = proptest::collection::vec(any::<prop::sample::Index>(), n - 1);
                let collapsed = proptest::collection::vec(any::<bool>(), n);
                (Just(n), parents, collapsed)
            })
            .prop_map(|(n, parents, collapsed_flags)| {
                let mut children: Vec<Vec<String>> = vec![Vec::new(); n];
                for (offset, parent) in parents.iter().enumerate() {
                    let child = offset + 1;
                    children[parent.index(child)].push(format!("n{child}"));
                }
                let nodes = children
                    .into_iter()
                    .enumerate()
                    .map(|(i, kids)| {
                        CloudNode::new(format!("n{i}"), format!("n{i}"), NodeType::Service)
                            .with_children(kids)
                    })
                    .collect();
                let collapsed = collapsed_flags
                    .into_iter()
                    .enumerate()
                    .filter(|(_, flag)| *flag)
                    .map(|(i, _)| NodeId(format!("n{i}")))
                    .collect();
                (Dataset::new("n0", nodes), collapsed)
            })
    }

    /// Reference reachability: naive recursive walk.
    fn reachable(dataset: &Dataset, collapsed: &CollapseSet, id: &NodeId, out: &mut HashSet<NodeId>) {
        out.insert(id.clone());
        if collapsed.is_collapsed(id) {
            return;
        }
        if let Some(node) = dataset.get(id) {
            for child in &node.children {
                reachable(dataset, collapsed, child, out);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_visible_set_is_reachable_set((dataset, collapsed) in tree_strategy()) {
            let graph = reduce(&dataset, &collapsed, CountFilter::All).unwrap();

            let mut expected = HashSet::new();
            reachable(&dataset, &collapsed, dataset.root(), &mut expected);
            let actual: HashSet<NodeId> = graph.nodes.iter().map(|n| n.id.clone()).collect();

            prop_assert_eq!(actual, expected);
            prop_assert_eq!(graph.edges.len(), graph.nodes.len() - 1);
            for edge in &graph.edges {
                let parent = graph.node(&edge.source).unwrap();
                prop_assert!(!parent.collapsed);
                prop_assert!(graph.contains_node(&edge.target));
            }
        }

        #[test]
        fn prop_collapse_round_trip((dataset, _) in tree_strategy(), pick in any::<prop::sample::Index>()) {
            let before = reduce(&dataset, &CollapseSet::new(), CountFilter::All).unwrap();
            let target = before.nodes[pick.index(before.nodes.len())].id.clone();

            let mut collapsed = CollapseSet::new();
            collapsed.toggle(&target);
            let during = reduce(&dataset, &collapsed, CountFilter::All).unwrap();

            let hidden: HashSet<NodeId> = descendants(&dataset, &target).unwrap().into_iter().collect();
            for node in &before.nodes {
                prop_assert_eq!(during.contains_node(&node.id), !hidden.contains(&node.id));
            }

            collapsed.toggle(&target);
            let after = reduce(&dataset, &collapsed, CountFilter::All).unwrap();
            prop_assert_eq!(after, before);
        }

        #[test]
        fn prop_filter_never_changes_visible_set((dataset, collapsed) in tree_strategy()) {
            let all = reduce(&dataset, &collapsed, CountFilter::All).unwrap();
            for filter in CountFilter::ALL {
                let other = reduce(&dataset, &collapsed, filter).unwrap();
                prop_assert_eq!(other.node_ids(), all.node_ids());
                prop_assert_eq!(other.edges.clone(), all.edges.clone());
            }
        }
    }
}

use crate::layout::LayoutError;
use cloudmap_core::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: NodeId,
    pub size: Vec2,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub source: NodeIndex,
    pub target: NodeIndex,
}

/// Input of a single layout pass: nodes with a nominal size and directed
/// edges between them. Built fresh for every pass.
#[derive(Debug, Default, Clone)]
pub struct LayeredGraph {
    nodes: Vec<LayoutNode>,
    edges: Vec<LayoutEdge>,
    node_map: HashMap<NodeId, NodeIndex>,
}

impl LayeredGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId, size: Vec2) -> Result<NodeIndex, LayoutError> {
        if self.node_map.contains_key(&id) {
            return Err(LayoutError::DuplicateNode(id));
        }
        if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
            return Err(LayoutError::InvalidSize(id));
        }

        let idx = NodeIndex(self.nodes.len());
        self.node_map.insert(id.clone(), idx);
        self.nodes.push(LayoutNode { id, size });
        Ok(idx)
    }

    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId) -> Result<EdgeIndex, LayoutError> {
        let Some(&source_idx) = self.node_map.get(source) else {
            return Err(LayoutError::UnknownEndpoint(source.clone()));
        };
        let Some(&target_idx) = self.node_map.get(target) else {
            return Err(LayoutError::UnknownEndpoint(target.clone()));
        };

        let idx = EdgeIndex(self.edges.len());
        self.edges.push(LayoutEdge {
            source: source_idx,
            target: target_idx,
        });
        Ok(idx)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.nodes.len()).map(NodeIndex)
    }

    /// Outgoing and incoming neighbor lists per node, in edge insertion order.
    pub fn adjacency(&self) -> (Vec<Vec<NodeIndex>>, Vec<Vec<NodeIndex>>) {
        let mut outgoing = vec![Vec::new(); self.nodes.len()];
        let mut incoming = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            outgoing[edge.source.0].push(edge.target);
            incoming[edge.target.0].push(edge.source);
        }
        (outgoing, incoming)
    }
}

impl Index<NodeIndex> for LayeredGraph {
    type Output = LayoutNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size() -> Vec2 {
        Vec2::new(100.0, 30.0)
    }

    #[test]
    fn test_layered_graph() {
        let mut graph = LayeredGraph::new();
        let a = graph.add_node(NodeId::from("A"), size()).unwrap();
        let b = graph.add_node(NodeId::from("B"), size()).unwrap();
        let e = graph.add_edge(&NodeId::from("A"), &NodeId::from("B")).unwrap();
        assert_eq!(e, EdgeIndex(0));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph[b].id, NodeId::from("B"));

        let (outgoing, incoming) = graph.adjacency();
        assert_eq!(outgoing[a.0], vec![b]);
        assert_eq!(incoming[b.0], vec![a]);
    }

    #[test]
    fn test_rejects_duplicate_nodes() {
        let mut graph = LayeredGraph::new();
        graph.add_node(NodeId::from("A"), size()).unwrap();
        let err = graph.add_node(NodeId::from("A"), size()).unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateNode(_)));
    }

    #[test]
    fn test_rejects_edges_to_unregistered_nodes() {
        let mut graph = LayeredGraph::new();
        graph.add_node(NodeId::from("A"), size()).unwrap();
        let err = graph
            .add_edge(&NodeId::from("A"), &NodeId::from("ghost"))
            .unwrap_err();
        assert_eq!(err, LayoutError::UnknownEndpoint(NodeId::from("ghost")));
    }

    #[test]
    fn test_rejects_degenerate_sizes() {
        let mut graph = LayeredGraph::new();
        let err = graph
            .add_node(NodeId::from("A"), Vec2::new(f32::NAN, 10.0))
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidSize(_)));
    }
}

use crate::graph::Vec2;
use crate::layout::AnchorSide;
use crate::style::{AlertSeverity, CollapseBadge, Counter, EdgeStyle, LegendEntry, NodeColors};
use cloudmap_core::{CountFilter, EdgeId, LayoutDirection, NodeId, NodeType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGraphNode {
    pub id: NodeId,
    /// Top-left corner in graph space
    pub position: Vec2,
    pub size: Vec2,
    pub source_side: AnchorSide,
    pub target_side: AnchorSide,
    pub label: String,
    pub node_type: NodeType,
    pub icon: Option<String>,
    pub severity: AlertSeverity,
    pub colors: NodeColors,
    /// Only the counters the active filter allows
    pub counters: Vec<Counter>,
    pub badge: CollapseBadge,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGraphEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub style: EdgeStyle,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGraph {
    pub nodes: Vec<NodeGraphNode>,
    pub edges: Vec<NodeGraphEdge>,
    pub direction: LayoutDirection,
    pub filter: CountFilter,
    pub bounds: Vec2,
}

impl NodeGraph {
    pub fn node(&self, id: &NodeId) -> Option<&NodeGraphNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
    pub total_alerts: u64,
    pub total_misconfigs: u64,
}

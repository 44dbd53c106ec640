use crate::graph::Vec2;
use crate::layout::PositionedNode;
use crate::node_graph::{Legend, NodeGraph, NodeGraphEdge, NodeGraphNode};
use crate::style::{
    AlertSeverity, CollapseBadge, counters_for, get_edge_style, get_node_style, legend_entries,
};
use crate::visibility::VisibleEdge;
use cloudmap_core::{CountFilter, Dataset, LayoutDirection, NodeId};
use std::collections::HashMap;

/// Turns positioned nodes and visible edges into the render payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeGraphConverter;

impl NodeGraphConverter {
    pub fn new() -> Self {
        Self
    }

    fn convert_node(node: &PositionedNode) -> NodeGraphNode {
        let visible = &node.node;
        let style = get_node_style(&visible.node_type, visible.alerts);

        NodeGraphNode {
            id: visible.id.clone(),
            position: node.position,
            size: node.size,
            source_side: node.source_side,
            target_side: node.target_side,
            label: visible.label.clone(),
            node_type: visible.node_type.clone(),
            icon: style.icon.map(str::to_string),
            severity: style.severity,
            colors: style.colors,
            counters: counters_for(visible.alerts, visible.misconfigs, visible.filter),
            badge: CollapseBadge::for_node(
                visible.has_children,
                visible.collapsed,
                visible.child_count,
            ),
            collapsed: visible.collapsed,
        }
    }

    fn convert_edge(
        edge: &VisibleEdge,
        targets: &HashMap<&NodeId, &NodeGraphNode>,
    ) -> NodeGraphEdge {
        let (severity, collapsed) = targets
            .get(&edge.target)
            .map(|node| (node.severity, node.collapsed))
            .unwrap_or((AlertSeverity::Low, false));

        NodeGraphEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            style: get_edge_style(severity, collapsed),
        }
    }

    pub fn convert(
        &self,
        nodes: &[PositionedNode],
        edges: &[VisibleEdge],
        direction: LayoutDirection,
        filter: CountFilter,
    ) -> NodeGraph {
        let graph_nodes: Vec<NodeGraphNode> = nodes.iter().map(Self::convert_node).collect();

        let by_id: HashMap<&NodeId, &NodeGraphNode> =
            graph_nodes.iter().map(|node| (&node.id, node)).collect();
        let graph_edges = edges
            .iter()
            .map(|edge| Self::convert_edge(edge, &by_id))
            .collect();

        let bounds = nodes.iter().fold(Vec2::default(), |acc, node| {
            Vec2::new(
                acc.x.max(node.position.x + node.size.x),
                acc.y.max(node.position.y + node.size.y),
            )
        });

        NodeGraph {
            nodes: graph_nodes,
            edges: graph_edges,
            direction,
            filter,
            bounds,
        }
    }

    pub fn legend(&self, dataset: &Dataset, active: CountFilter) -> Legend {
        let (total_alerts, total_misconfigs) = dataset.totals();
        Legend {
            entries: legend_entries(active),
            total_alerts,
            total_misconfigs,
        }
    }
}

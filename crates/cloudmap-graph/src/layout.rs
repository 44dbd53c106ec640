use crate::graph::{LayeredGraph, NodeIndex, Vec2};
use crate::visibility::{VisibleGraph, VisibleNode};
use cloudmap_core::{LayoutDirection, NodeId, TopologyError};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Node {0} registered twice")]
    DuplicateNode(NodeId),
    #[error("Edge endpoint {0} is not a registered node")]
    UnknownEndpoint(NodeId),
    #[error("Node {0} has a non-positive or non-finite size")]
    InvalidSize(NodeId),
    #[error("Graph contains a cycle through node {0}")]
    Cycle(NodeId),
    #[error("Layouter returned {actual} positions for {expected} nodes")]
    IncompleteOutput { expected: usize, actual: usize },
    #[error("Layouter returned a non-finite position for node {0}")]
    NonFinitePosition(NodeId),
}

impl From<LayoutError> for TopologyError {
    fn from(err: LayoutError) -> Self {
        TopologyError::LayoutFailure(err.to_string())
    }
}

/// Which side of a node an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl AnchorSide {
    pub fn opposite(&self) -> Self {
        match self {
            AnchorSide::Left => AnchorSide::Right,
            AnchorSide::Right => AnchorSide::Left,
            AnchorSide::Top => AnchorSide::Bottom,
            AnchorSide::Bottom => AnchorSide::Top,
        }
    }

    /// Incoming side of a node for a flow direction. Outgoing is the opposite.
    pub fn target_for(direction: LayoutDirection) -> Self {
        match direction {
            LayoutDirection::Vertical => AnchorSide::Top,
            LayoutDirection::Horizontal => AnchorSide::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpacing {
    /// Gap between neighbours on the same rank
    pub node_spacing: f32,
    /// Gap between consecutive ranks
    pub rank_spacing: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub node_width: f32,
    pub node_height: f32,
    pub vertical: LayoutSpacing,
    /// Ranks run along the screen width here, so they get more room.
    pub horizontal: LayoutSpacing,
}

impl LayoutSettings {
    pub const DEFAULT_NODE_WIDTH: f32 = 180.0;
    pub const DEFAULT_NODE_HEIGHT: f32 = 96.0;

    pub fn node_size(&self) -> Vec2 {
        Vec2::new(self.node_width, self.node_height)
    }

    pub fn spacing_for(&self, direction: LayoutDirection) -> LayoutSpacing {
        match direction {
            LayoutDirection::Vertical => self.vertical,
            LayoutDirection::Horizontal => self.horizontal,
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            node_width: Self::DEFAULT_NODE_WIDTH,
            node_height: Self::DEFAULT_NODE_HEIGHT,
            vertical: LayoutSpacing {
                node_spacing: 50.0,
                rank_spacing: 80.0,
            },
            horizontal: LayoutSpacing {
                node_spacing: 30.0,
                rank_spacing: 140.0,
            },
        }
    }
}

/// Node centers indexed by [`NodeIndex`], plus the overall extent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutOutput {
    pub centers: Vec<Vec2>,
    pub bounds: Vec2,
}

/// A layout engine: a pure function of graph, direction and spacing.
pub trait Layouter {
    fn execute(
        &self,
        graph: &LayeredGraph,
        direction: LayoutDirection,
        spacing: LayoutSpacing,
    ) -> Result<LayoutOutput, LayoutError>;
}

/// Layered (Sugiyama-style) layout for directed acyclic graphs.
///
/// Nodes are ranked by longest path from the sources, each rank is ordered
/// with barycenter sweeps, and parents are then centered over their
/// children without letting neighbours on a rank overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredLayouter;

impl LayeredLayouter {
    const BARYCENTER_PASSES: usize = 2;

    /// (cross-axis extent, rank-axis extent) of a node.
    fn extents(size: Vec2, direction: LayoutDirection) -> (f32, f32) {
        match direction {
            LayoutDirection::Vertical => (size.x, size.y),
            LayoutDirection::Horizontal => (size.y, size.x),
        }
    }

    fn assign_ranks(
        graph: &LayeredGraph,
        outgoing: &[Vec<NodeIndex>],
        incoming: &[Vec<NodeIndex>],
    ) -> Result<Vec<usize>, LayoutError> {
        let mut in_degree: Vec<usize> = incoming.iter().map(Vec::len).collect();
        let mut ranks = vec![0usize; graph.node_count()];
        let mut queue: VecDeque<NodeIndex> = graph
            .node_indices()
            .filter(|idx| in_degree[idx.0] == 0)
            .collect();
        let mut processed = 0;

        while let Some(node) = queue.pop_front() {
            processed += 1;
            for &target in &outgoing[node.0] {
                ranks[target.0] = ranks[target.0].max(ranks[node.0] + 1);
                in_degree[target.0] -= 1;
                if in_degree[target.0] == 0 {
                    queue.push_back(target);
                }
            }
        }

        if processed < graph.node_count() {
            let stuck = graph
                .node_indices()
                .find(|idx| in_degree[idx.0] > 0)
                .map(|idx| graph[idx].id.clone())
                .unwrap_or_else(|| NodeId::from("?"));
            return Err(LayoutError::Cycle(stuck));
        }

        Ok(ranks)
    }

    fn build_layers(ranks: &[usize]) -> Vec<Vec<NodeIndex>> {
        let layer_count = ranks.iter().max().map_or(0, |max| max + 1);
        let mut layers = vec![Vec::new(); layer_count];
        for (idx, &rank) in ranks.iter().enumerate() {
            layers[rank].push(NodeIndex(idx));
        }
        layers
    }

    fn order_layer_by_barycenter(
        layer_nodes: &mut [NodeIndex],
        order: &[f32],
        neighbors: &[Vec<NodeIndex>],
    ) {
        let barycenter = |node: &NodeIndex| -> f32 {
            let adjacent = &neighbors[node.0];
            if adjacent.is_empty() {
                order[node.0]
            } else {
                adjacent.iter().map(|n| order[n.0]).sum::<f32>() / adjacent.len() as f32
            }
        };

        layer_nodes.sort_by(|a, b| {
            barycenter(a)
                .partial_cmp(&barycenter(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    fn reindex(layer: &[NodeIndex], order: &mut [f32]) {
        for (j, node) in layer.iter().enumerate() {
            order[node.0] = j as f32;
        }
    }

    fn run_barycenter_passes(
        layers: &mut [Vec<NodeIndex>],
        node_count: usize,
        outgoing: &[Vec<NodeIndex>],
        incoming: &[Vec<NodeIndex>],
    ) {
        let mut order = vec![0.0f32; node_count];
        for layer in layers.iter() {
            Self::reindex(layer, &mut order);
        }

        for _ in 0..Self::BARYCENTER_PASSES {
            for layer in layers.iter_mut().skip(1) {
                Self::order_layer_by_barycenter(layer, &order, incoming);
                Self::reindex(layer, &mut order);
            }

            let len = layers.len();
            for layer in layers.iter_mut().take(len.saturating_sub(1)).rev() {
                Self::order_layer_by_barycenter(layer, &order, outgoing);
                Self::reindex(layer, &mut order);
            }
        }
    }

    /// Pushes nodes along the cross axis so neighbours keep `node_spacing`.
    fn resolve_overlaps(layer: &[NodeIndex], cross: &mut [f32], widths: &[f32], node_spacing: f32) {
        let mut previous_edge: Option<f32> = None;
        for node in layer {
            let half = widths[node.0] / 2.0;
            if let Some(edge) = previous_edge {
                cross[node.0] = cross[node.0].max(edge + node_spacing + half);
            }
            previous_edge = Some(cross[node.0] + half);
        }
    }

    fn place_cross_axis(
        layers: &[Vec<NodeIndex>],
        outgoing: &[Vec<NodeIndex>],
        widths: &[f32],
        node_spacing: f32,
    ) -> Vec<f32> {
        let mut cross = vec![0.0f32; widths.len()];

        for layer in layers {
            let mut cursor = 0.0;
            for node in layer {
                cross[node.0] = cursor + widths[node.0] / 2.0;
                cursor += widths[node.0] + node_spacing;
            }
        }

        // Bottom-up: center parents over their children.
        for layer in layers.iter().rev().skip(1) {
            for node in layer {
                let children = &outgoing[node.0];
                if !children.is_empty() {
                    cross[node.0] =
                        children.iter().map(|c| cross[c.0]).sum::<f32>() / children.len() as f32;
                }
            }
            Self::resolve_overlaps(layer, &mut cross, widths, node_spacing);
        }

        let min_edge = layers
            .iter()
            .flatten()
            .map(|node| cross[node.0] - widths[node.0] / 2.0)
            .fold(f32::INFINITY, f32::min);
        if min_edge.is_finite() {
            for value in cross.iter_mut() {
                *value -= min_edge;
            }
        }

        cross
    }

    /// Center coordinate of every rank along the rank axis.
    fn place_rank_axis(layers: &[Vec<NodeIndex>], depths: &[f32], rank_spacing: f32) -> Vec<f32> {
        let mut centers = Vec::with_capacity(layers.len());
        let mut cursor = 0.0;
        for layer in layers {
            let extent = layer
                .iter()
                .map(|node| depths[node.0])
                .fold(0.0f32, f32::max);
            centers.push(cursor + extent / 2.0);
            cursor += extent + rank_spacing;
        }
        centers
    }
}

impl Layouter for LayeredLayouter {
    fn execute(
        &self,
        graph: &LayeredGraph,
        direction: LayoutDirection,
        spacing: LayoutSpacing,
    ) -> Result<LayoutOutput, LayoutError> {
        if graph.node_count() == 0 {
            return Ok(LayoutOutput::default());
        }

        let (outgoing, incoming) = graph.adjacency();
        let ranks = Self::assign_ranks(graph, &outgoing, &incoming)?;
        let mut layers = Self::build_layers(&ranks);
        Self::run_barycenter_passes(&mut layers, graph.node_count(), &outgoing, &incoming);

        let (widths, depths): (Vec<f32>, Vec<f32>) = graph
            .node_indices()
            .map(|idx| Self::extents(graph[idx].size, direction))
            .unzip();

        let cross = Self::place_cross_axis(&layers, &outgoing, &widths, spacing.node_spacing);
        let rank_centers = Self::place_rank_axis(&layers, &depths, spacing.rank_spacing);

        let mut centers = Vec::with_capacity(graph.node_count());
        let mut bounds = Vec2::default();
        for idx in graph.node_indices() {
            let along = rank_centers[ranks[idx.0]];
            let size = graph[idx].size;
            let center = match direction {
                LayoutDirection::Vertical => Vec2::new(cross[idx.0], along),
                LayoutDirection::Horizontal => Vec2::new(along, cross[idx.0]),
            };
            bounds.x = bounds.x.max(center.x + size.x / 2.0);
            bounds.y = bounds.y.max(center.y + size.y / 2.0);
            centers.push(center);
        }

        tracing::debug!(
            "Layered layout placed {} nodes and {} edges on {} ranks ({:?})",
            graph.node_count(),
            graph.edge_count(),
            layers.len(),
            direction
        );

        Ok(LayoutOutput { centers, bounds })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub node: VisibleNode,
    /// Top-left corner
    pub position: Vec2,
    pub size: Vec2,
    /// Side outgoing edges leave from
    pub source_side: AnchorSide,
    /// Side incoming edges arrive at
    pub target_side: AnchorSide,
}

impl PositionedNode {
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.size.x / 2.0,
            self.position.y + self.size.y / 2.0,
        )
    }
}

/// Runs one layout pass over a visible graph.
///
/// A fresh [`LayeredGraph`] is built for every call, so no engine state is
/// shared between passes. Any engine error fails the whole pass.
#[derive(Debug, Clone)]
pub struct LayoutAdapter<L = LayeredLayouter> {
    layouter: L,
    settings: LayoutSettings,
}

impl LayoutAdapter<LayeredLayouter> {
    pub fn new(settings: LayoutSettings) -> Self {
        Self::with_layouter(LayeredLayouter, settings)
    }
}

impl Default for LayoutAdapter<LayeredLayouter> {
    fn default() -> Self {
        Self::new(LayoutSettings::default())
    }
}

impl<L: Layouter> LayoutAdapter<L> {
    pub fn with_layouter(layouter: L, settings: LayoutSettings) -> Self {
        Self { layouter, settings }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn layout(
        &self,
        graph: &VisibleGraph,
        direction: LayoutDirection,
    ) -> Result<Vec<PositionedNode>, TopologyError> {
        let size = self.settings.node_size();
        let mut layered = LayeredGraph::new();
        for node in &graph.nodes {
            layered.add_node(node.id.clone(), size)?;
        }
        for edge in &graph.edges {
            layered.add_edge(&edge.source, &edge.target)?;
        }

        let output =
            self.layouter
                .execute(&layered, direction, self.settings.spacing_for(direction))?;

        if output.centers.len() != layered.node_count() {
            return Err(LayoutError::IncompleteOutput {
                expected: layered.node_count(),
                actual: output.centers.len(),
            }
            .into());
        }

        let target_side = AnchorSide::target_for(direction);
        let source_side = target_side.opposite();

        graph
            .nodes
            .iter()
            .zip(output.centers)
            .map(|(node, center)| -> Result<PositionedNode, TopologyError> {
                if !center.is_finite() {
                    return Err(LayoutError::NonFinitePosition(node.id.clone()).into());
                }
                Ok(PositionedNode {
                    node: node.clone(),
                    position: Vec2::new(center.x - size.x / 2.0, center.y - size.y / 2.0),
                    size,
                    source_side,
                    target_side,
                })
            })
            .collect()
    }
}

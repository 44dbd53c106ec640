pub mod converter;
pub mod graph;
pub mod layout;
pub mod node_graph;
pub mod style;
pub mod visibility;

pub use converter::NodeGraphConverter;
pub use graph::{EdgeIndex, LayeredGraph, NodeIndex, Vec2};
pub use layout::{
    AnchorSide, LayeredLayouter, LayoutAdapter, LayoutError, LayoutOutput, LayoutSettings,
    LayoutSpacing, Layouter, PositionedNode,
};
pub use node_graph::{Legend, NodeGraph, NodeGraphEdge, NodeGraphNode};
pub use style::{
    AlertSeverity, CollapseBadge, Color, Counter, CounterKind, EdgeStyle, LegendEntry,
    NodeColors, NodeStyle, get_edge_style, get_icon_for_type, get_node_colors, get_node_style,
    get_type_label, legend_entries,
};
pub use visibility::{VisibleEdge, VisibleGraph, VisibleNode, descendants, reduce};

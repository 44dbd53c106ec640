use crate::NodeId;
use thiserror::Error;

/// Failures of a render pass over the topology.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The dataset root is missing, so nothing can be rendered.
    #[error("Root node {0} not found in dataset")]
    NotFound(NodeId),
    /// A node lists a child id that the dataset does not contain.
    #[error("Node {parent} references missing child {child}")]
    DanglingReference { parent: NodeId, child: NodeId },
    /// The layout engine rejected the visible graph.
    #[error("Layout failed: {0}")]
    LayoutFailure(String),
}

impl TopologyError {
    /// Startup errors leave nothing to fall back to.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TopologyError::NotFound(_))
    }
}

use crate::{CloudNode, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// On-disk shape of a dataset: a root id and a flat node list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument {
    pub root: NodeId,
    #[serde(default)]
    pub nodes: Vec<CloudNode>,
}

/// Read-only topology with O(1) lookup by id.
///
/// Duplicate ids keep the first occurrence; later ones are ignored and
/// listed by [`Dataset::duplicate_ids`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "DatasetDocument", into = "DatasetDocument")]
pub struct Dataset {
    root: NodeId,
    nodes: Vec<CloudNode>,
    node_map: HashMap<NodeId, usize>,
    duplicates: Vec<NodeId>,
}

impl Dataset {
    pub fn new(root: impl Into<NodeId>, nodes: Vec<CloudNode>) -> Self {
        let mut node_map = HashMap::with_capacity(nodes.len());
        let mut duplicates = Vec::new();
        for (idx, node) in nodes.iter().enumerate() {
            if node_map.contains_key(&node.id) {
                duplicates.push(node.id.clone());
            } else {
                node_map.insert(node.id.clone(), idx);
            }
        }

        Self {
            root: root.into(),
            nodes,
            node_map,
            duplicates,
        }
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn get(&self, id: &NodeId) -> Option<&CloudNode> {
        self.node_map.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Nodes in dataset order, duplicates excluded.
    pub fn nodes(&self) -> impl Iterator<Item = &CloudNode> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(idx, node)| self.node_map.get(&node.id) == Some(idx))
            .map(|(_, node)| node)
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    pub fn duplicate_ids(&self) -> &[NodeId] {
        &self.duplicates
    }

    /// Sum of (alerts, misconfigs) over every node.
    pub fn totals(&self) -> (u64, u64) {
        self.nodes().fold((0, 0), |(alerts, misconfigs), node| {
            (
                alerts + u64::from(node.alerts),
                misconfigs + u64::from(node.misconfigs),
            )
        })
    }
}

impl From<DatasetDocument> for Dataset {
    fn from(doc: DatasetDocument) -> Self {
        Dataset::new(doc.root, doc.nodes)
    }
}

impl From<Dataset> for DatasetDocument {
    fn from(dataset: Dataset) -> Self {
        let Dataset {
            root,
            nodes,
            node_map,
            ..
        } = dataset;
        let nodes = nodes
            .into_iter()
            .enumerate()
            .filter(|(idx, node)| node_map.get(&node.id) == Some(idx))
            .map(|(_, node)| node)
            .collect();
        DatasetDocument { root, nodes }
    }
}

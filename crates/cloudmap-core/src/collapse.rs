use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-node collapsed flags. An id that was never toggled is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollapseSet {
    flags: HashMap<NodeId, bool>,
}

impl CollapseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, id: &NodeId) -> bool {
        self.flags.get(id).copied().unwrap_or(false)
    }

    /// Flips the flag and returns the new state.
    pub fn toggle(&mut self, id: &NodeId) -> bool {
        let flag = self.flags.entry(id.clone()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn set(&mut self, id: NodeId, collapsed: bool) {
        self.flags.insert(id, collapsed);
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }

    /// Ids currently collapsed, sorted for stable output.
    pub fn collapsed_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<_> = self
            .flags
            .iter()
            .filter(|(_, collapsed)| **collapsed)
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids
    }
}

impl FromIterator<NodeId> for CollapseSet {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        Self {
            flags: iter.into_iter().map(|id| (id, true)).collect(),
        }
    }
}

use cloudmap_core::{CloudNode, Dataset, NodeType};
use std::fs;
use tempfile::TempDir;

const LEVELS: [NodeType; 4] = [
    NodeType::Cloud,
    NodeType::Aws,
    NodeType::Account,
    NodeType::Service,
];

/// A complete tree with `fanout` children per node, `depth` levels below the root.
pub fn generate_synthetic_dataset(depth: usize, fanout: usize) -> Dataset {
    let mut nodes = Vec::new();
    let mut frontier = vec![("n".to_string(), 0usize)];

    while let Some((id, level)) = frontier.pop() {
        let children: Vec<String> = if level < depth {
            (0..fanout).map(|i| format!("{id}.{i}")).collect()
        } else {
            Vec::new()
        };
        let node_type = LEVELS[level.min(LEVELS.len() - 1)].clone();
        // Spread alert counts over all three severity tiers.
        let alerts = (nodes.len() as u32 * 37) % 160;
        nodes.push(
            CloudNode::new(id.as_str(), id.as_str(), node_type)
                .with_counts(alerts, alerts % 7)
                .with_children(children.iter().map(String::as_str)),
        );
        frontier.extend(children.into_iter().map(|child| (child, level + 1)));
    }

    Dataset::new("n", nodes)
}

/// Writes a synthetic dataset as JSON into a fresh temp dir.
pub fn generate_synthetic_dataset_file(depth: usize, fanout: usize) -> anyhow::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let dataset = generate_synthetic_dataset(depth, fanout);
    fs::write(
        temp_dir.path().join("dataset.json"),
        serde_json::to_string(&dataset)?,
    )?;
    Ok(temp_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_tree_size() {
        // 1 + 4 + 16 + 64
        assert_eq!(generate_synthetic_dataset(3, 4).len(), 85);
        assert_eq!(generate_synthetic_dataset(0, 4).len(), 1);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod collapse;
pub mod dataset;
pub mod error;

pub use collapse::CollapseSet;
pub use dataset::{Dataset, DatasetDocument};
pub use error::TopologyError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Stable identifier of a parent -> child edge, rendered as `parent-child`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn between(parent: &NodeId, child: &NodeId) -> Self {
        Self(format!("{}-{}", parent.0, child.0))
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of an infrastructure node.
///
/// Unrecognized type strings are kept as `Other` so that a dataset with a new
/// provider still loads; the presentation layer simply draws no icon for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Cloud,
    Gcp,
    Aws,
    Azure,
    Saas,
    Account,
    Service,
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Cloud => "cloud",
            NodeType::Gcp => "gcp",
            NodeType::Aws => "aws",
            NodeType::Azure => "azure",
            NodeType::Saas => "saas",
            NodeType::Account => "account",
            NodeType::Service => "service",
            NodeType::Other(name) => name,
        }
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "cloud" => NodeType::Cloud,
            "gcp" => NodeType::Gcp,
            "aws" => NodeType::Aws,
            "azure" => NodeType::Azure,
            "saas" => NodeType::Saas,
            "account" => NodeType::Account,
            "service" => NodeType::Service,
            _ => NodeType::Other(value),
        }
    }
}

impl From<&str> for NodeType {
    fn from(value: &str) -> Self {
        NodeType::from(value.to_string())
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudNode {
    pub id: NodeId,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub alerts: u32,
    #[serde(default)]
    pub misconfigs: u32,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

impl CloudNode {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type,
            alerts: 0,
            misconfigs: 0,
            children: Vec::new(),
        }
    }

    pub fn with_counts(mut self, alerts: u32, misconfigs: u32) -> Self {
        self.alerts = alerts;
        self.misconfigs = misconfigs;
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Which per-node counters are drawn. Never affects traversal or layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CountFilter {
    #[default]
    All,
    Alerts,
    #[serde(alias = "misconfigs")]
    Misconfigurations,
}

impl CountFilter {
    pub const ALL: [CountFilter; 3] = [
        CountFilter::All,
        CountFilter::Alerts,
        CountFilter::Misconfigurations,
    ];

    pub fn shows_alerts(self) -> bool {
        matches!(self, CountFilter::All | CountFilter::Alerts)
    }

    pub fn shows_misconfigs(self) -> bool {
        matches!(self, CountFilter::All | CountFilter::Misconfigurations)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnumConversionError {
    #[error("Invalid CountFilter value: {0}")]
    InvalidCountFilter(String),
    #[error("Invalid LayoutDirection value: {0}")]
    InvalidLayoutDirection(String),
}

impl std::str::FromStr for CountFilter {
    type Err = EnumConversionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "all" => Ok(CountFilter::All),
            "alerts" => Ok(CountFilter::Alerts),
            "misconfigs" | "misconfigurations" => Ok(CountFilter::Misconfigurations),
            _ => Err(EnumConversionError::InvalidCountFilter(value.to_string())),
        }
    }
}

impl fmt::Display for CountFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountFilter::All => write!(f, "all"),
            CountFilter::Alerts => write!(f, "alerts"),
            CountFilter::Misconfigurations => write!(f, "misconfigurations"),
        }
    }
}

/// Layout flow direction.
///
/// `Vertical` ranks top-to-bottom, `Horizontal` ranks left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LayoutDirection {
    #[serde(alias = "LR")]
    Horizontal,
    #[default]
    #[serde(alias = "TB")]
    Vertical,
}

impl std::str::FromStr for LayoutDirection {
    type Err = EnumConversionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "horizontal" | "lr" => Ok(LayoutDirection::Horizontal),
            "vertical" | "tb" => Ok(LayoutDirection::Vertical),
            _ => Err(EnumConversionError::InvalidLayoutDirection(
                value.to_string(),
            )),
        }
    }
}

//! Graph View Style System
//!
//! Maps alert counts to severity colors, node types to icons, and the
//! active count filter to the counters and legend entries that get drawn.

use cloudmap_core::{CountFilter, NodeType};
use serde::{Deserialize, Serialize};

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Scales each channel toward black by `factor` (0.0 to 1.0).
    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Alert tier of a node, independent of the active filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    /// Upper bound (inclusive) of the low tier
    pub const LOW_MAX: u32 = 50;
    /// Upper bound (inclusive) of the medium tier
    pub const MEDIUM_MAX: u32 = 100;

    pub fn from_alerts(alerts: u32) -> Self {
        if alerts <= Self::LOW_MAX {
            AlertSeverity::Low
        } else if alerts <= Self::MEDIUM_MAX {
            AlertSeverity::Medium
        } else {
            AlertSeverity::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeColors {
    pub fill: Color,
    pub border: Color,
    pub text: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub color: Color,
    pub width: f32,
    pub dashed: bool,
    pub arrow_head: bool,
    pub animated: bool,
}

/// Complete style for a graph node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub severity: AlertSeverity,
    pub colors: NodeColors,
    pub corner_radius: f32,
    pub font_size: f32,
    pub icon: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    Alerts,
    Misconfigs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub kind: CounterKind,
    pub value: u32,
    pub color: Color,
}

/// Expand/collapse affordance below the node body.
///
/// Expanded parents get an empty placeholder of the same size as the
/// `+N` badge so node height does not change on toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "hidden")]
pub enum CollapseBadge {
    None,
    Placeholder,
    Hidden(usize),
}

impl CollapseBadge {
    pub fn for_node(has_children: bool, collapsed: bool, child_count: usize) -> Self {
        match (has_children, collapsed) {
            (false, _) => CollapseBadge::None,
            (true, true) => CollapseBadge::Hidden(child_count),
            (true, false) => CollapseBadge::Placeholder,
        }
    }

    pub fn label(&self) -> Option<String> {
        match self {
            CollapseBadge::Hidden(count) => Some(format!("+{count}")),
            CollapseBadge::Placeholder => Some(String::new()),
            CollapseBadge::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub filter: CountFilter,
    pub label: &'static str,
    pub color: Color,
    pub active: bool,
}

// ============================================================================
// Color Constants
// ============================================================================

// Low alert tier (green)
pub const COLOR_LOW_FILL: Color = Color::rgb(76, 175, 80);

// Medium alert tier (orange)
pub const COLOR_MEDIUM_FILL: Color = Color::rgb(255, 152, 0);

// High alert tier (red)
pub const COLOR_HIGH_FILL: Color = Color::rgb(244, 67, 54);

/// How much darker a node border is than its fill.
pub const BORDER_DARKEN: f32 = 0.2;

pub const COLOR_NODE_TEXT: Color = Color::rgb(255, 255, 255);

// Counters and legend
pub const COLOR_ALERT_COUNTER: Color = Color::rgb(211, 47, 47);
pub const COLOR_MISCONFIG_COUNTER: Color = Color::rgb(245, 124, 0);
pub const COLOR_ALL_COUNTS: Color = Color::rgb(96, 125, 139);

// Edges
pub const COLOR_EDGE: Color = Color::rgb(120, 144, 156);
pub const COLOR_EDGE_HIGH: Color = Color::rgb(244, 67, 54);

// ============================================================================
// Style Functions
// ============================================================================

pub fn get_node_colors(severity: AlertSeverity) -> NodeColors {
    let fill = match severity {
        AlertSeverity::Low => COLOR_LOW_FILL,
        AlertSeverity::Medium => COLOR_MEDIUM_FILL,
        AlertSeverity::High => COLOR_HIGH_FILL,
    };
    NodeColors {
        fill,
        border: fill.darken(BORDER_DARKEN),
        text: COLOR_NODE_TEXT,
    }
}

pub fn get_node_style(node_type: &NodeType, alerts: u32) -> NodeStyle {
    let severity = AlertSeverity::from_alerts(alerts);
    NodeStyle {
        severity,
        colors: get_node_colors(severity),
        corner_radius: 8.0,
        font_size: get_font_size_for_type(node_type),
        icon: get_icon_for_type(node_type),
    }
}

/// Get icon identifier for node type. Unknown types have none.
pub fn get_icon_for_type(node_type: &NodeType) -> Option<&'static str> {
    match node_type {
        NodeType::Cloud => Some("cloud"),
        NodeType::Gcp => Some("gcp"),
        NodeType::Aws => Some("aws"),
        NodeType::Azure => Some("azure"),
        NodeType::Saas => Some("saas"),
        NodeType::Account => Some("account"),
        NodeType::Service => Some("service"),
        NodeType::Other(_) => None,
    }
}

fn get_font_size_for_type(node_type: &NodeType) -> f32 {
    match node_type {
        NodeType::Cloud => 16.0,
        NodeType::Gcp | NodeType::Aws | NodeType::Azure | NodeType::Saas => 14.0,
        _ => 13.0,
    }
}

pub fn get_type_label(node_type: &NodeType) -> &str {
    match node_type {
        NodeType::Cloud => "Cloud",
        NodeType::Gcp => "Google Cloud",
        NodeType::Aws => "AWS",
        NodeType::Azure => "Azure",
        NodeType::Saas => "SaaS",
        NodeType::Account => "Account",
        NodeType::Service => "Service",
        NodeType::Other(name) => name,
    }
}

/// Counters drawn for a node under `filter`. Excluded counters are absent.
pub fn counters_for(alerts: u32, misconfigs: u32, filter: CountFilter) -> Vec<Counter> {
    let mut counters = Vec::with_capacity(2);
    if filter.shows_alerts() {
        counters.push(Counter {
            kind: CounterKind::Alerts,
            value: alerts,
            color: COLOR_ALERT_COUNTER,
        });
    }
    if filter.shows_misconfigs() {
        counters.push(Counter {
            kind: CounterKind::Misconfigs,
            value: misconfigs,
            color: COLOR_MISCONFIG_COUNTER,
        });
    }
    counters
}

/// Style for the edge leading into a child node.
pub fn get_edge_style(target_severity: AlertSeverity, target_collapsed: bool) -> EdgeStyle {
    let high = target_severity == AlertSeverity::High;
    EdgeStyle {
        color: if high { COLOR_EDGE_HIGH } else { COLOR_EDGE },
        width: if high { 2.0 } else { 1.5 },
        dashed: target_collapsed,
        arrow_head: true,
        animated: high,
    }
}

pub fn get_filter_label(filter: CountFilter) -> &'static str {
    match filter {
        CountFilter::All => "All",
        CountFilter::Alerts => "Alerts",
        CountFilter::Misconfigurations => "Misconfigurations",
    }
}

fn get_filter_color(filter: CountFilter) -> Color {
    match filter {
        CountFilter::All => COLOR_ALL_COUNTS,
        CountFilter::Alerts => COLOR_ALERT_COUNTER,
        CountFilter::Misconfigurations => COLOR_MISCONFIG_COUNTER,
    }
}

pub fn legend_entries(active: CountFilter) -> Vec<LegendEntry> {
    CountFilter::ALL
        .into_iter()
        .map(|filter| LegendEntry {
            filter,
            label: get_filter_label(filter),
            color: get_filter_color(filter),
            active: filter == active,
        })
        .collect()
}

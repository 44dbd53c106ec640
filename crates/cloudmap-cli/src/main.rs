use anyhow::{Context, Result};
use clap::Parser;
use cloudmap_app::TopologyController;
use cloudmap_core::{CountFilter, NodeId};
use cloudmap_events::{Event, EventBus};
use cloudmap_graph::{Legend, NodeGraph, get_type_label};
use cloudmap_project::{Project, ViewSettings};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render a cloud topology frame", long_about = None)]
struct Args {
    /// Dataset JSON file (defaults to the bundled sample)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Toggle a node's collapse flag; applied in order
    #[arg(short, long = "collapse", value_name = "ID")]
    collapse: Vec<String>,

    /// Counter filter: all, alerts or misconfigs
    #[arg(short, long)]
    filter: Option<CountFilter>,

    /// Viewport width in pixels; narrow viewports lay out horizontally
    #[arg(short, long)]
    width: Option<f32>,

    /// Settings file (defaults to the user config dir)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Print a plain-text summary instead of JSON
    #[arg(long)]
    summary: bool,

    /// Print the legend instead of the graph
    #[arg(long)]
    legend: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => ViewSettings::load_from(path)?,
        None => ViewSettings::load(),
    };
    let project = Project::open(args.dataset.clone())?;

    let mut controller = TopologyController::new(project.dataset, settings)
        .context("failed to render the initial frame")?;

    let bus = EventBus::new();
    if let Some(width) = args.width {
        bus.publish(Event::ViewportResized { width });
    }
    for id in &args.collapse {
        bus.publish(Event::ToggleCollapse {
            id: NodeId::from(id.as_str()),
        });
    }
    if let Some(filter) = args.filter {
        bus.publish(Event::SetFilter(filter));
    }
    bus.dispatch_to(&mut controller);

    for event in controller.events().try_iter() {
        if let Event::RenderFailed { error } = event {
            eprintln!("Render failed, showing last good frame: {}", error);
        }
    }

    let output = match (args.legend, args.summary) {
        (true, true) => legend_summary(&controller.legend()),
        (true, false) => serde_json::to_string_pretty(&controller.legend())?,
        (false, true) => frame_summary(controller.frame()),
        (false, false) => serde_json::to_string_pretty(controller.frame())?,
    };
    println!("{}", output);
    Ok(())
}

fn frame_summary(frame: &NodeGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} nodes, {} edges ({:?}, filter: {})",
        frame.nodes.len(),
        frame.edges.len(),
        frame.direction,
        frame.filter
    );
    for node in &frame.nodes {
        let counters: Vec<String> = node
            .counters
            .iter()
            .map(|c| format!("{:?}={}", c.kind, c.value))
            .collect();
        let _ = writeln!(
            out,
            "  {:<20} {:<8} {:>7.1},{:>7.1} {:?} [{}]{}",
            node.id.as_str(),
            get_type_label(&node.node_type),
            node.position.x,
            node.position.y,
            node.severity,
            counters.join(" "),
            node.badge
                .label()
                .map(|badge| format!(" {}", badge))
                .unwrap_or_default(),
        );
    }
    out
}

fn legend_summary(legend: &Legend) -> String {
    let mut out = String::new();
    for entry in &legend.entries {
        let marker = if entry.active { "*" } else { " " };
        let _ = writeln!(out, "{} {} ({})", marker, entry.label, entry.color.to_hex());
    }
    let _ = writeln!(
        out,
        "alerts: {}, misconfigurations: {}",
        legend.total_alerts, legend.total_misconfigs
    );
    out
}

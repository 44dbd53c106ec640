use cloudmap_core::{CollapseSet, CountFilter, Dataset, LayoutDirection, NodeId, TopologyError};
use cloudmap_events::{Event, EventListener, RenderPass, RenderTrigger};
use cloudmap_graph::{
    LayeredLayouter, LayoutAdapter, Layouter, Legend, NodeGraph, NodeGraphConverter,
    PositionedNode, VisibleEdge, descendants, reduce,
};
use cloudmap_project::ViewSettings;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// Render outcomes kept for a consumer that has not drained them yet.
pub const OUTBOX_CAPACITY: usize = 64;

/// Bounded queue of render outcomes. When full the oldest event is dropped,
/// so an undrained outbox never grows past [`OUTBOX_CAPACITY`].
struct Outbox {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Outbox {
    fn new() -> Self {
        let (tx, rx) = bounded(OUTBOX_CAPACITY);
        Self { tx, rx }
    }

    fn publish(&self, mut event: Event) {
        loop {
            match self.tx.try_send(event) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(rejected)) => {
                    let _ = self.rx.try_recv();
                    event = rejected;
                }
            }
        }
    }
}

/// Last successfully rendered pass.
struct Frame {
    positioned: Vec<PositionedNode>,
    edges: Vec<VisibleEdge>,
    graph: NodeGraph,
}

/// Single owner of the interaction state for one topology view.
///
/// Every operation mutates the state and then synchronously renders a new
/// frame. When a pass fails the state change is kept, the previous frame
/// stays current, and a `RenderFailed` event goes out on [`Self::events`].
pub struct TopologyController<L = LayeredLayouter> {
    dataset: Dataset,
    collapsed: CollapseSet,
    filter: CountFilter,
    viewport_width: Option<f32>,
    settings: ViewSettings,
    adapter: LayoutAdapter<L>,
    converter: NodeGraphConverter,
    outbox: Outbox,
    frame: Frame,
    /// The current frame predates the latest state change.
    stale: bool,
}

impl TopologyController<LayeredLayouter> {
    pub fn new(dataset: Dataset, settings: ViewSettings) -> Result<Self, TopologyError> {
        let adapter = LayoutAdapter::new(settings.layout.clone());
        Self::with_adapter(dataset, settings, adapter)
    }
}

impl<L: Layouter> TopologyController<L> {
    pub fn with_layouter(
        dataset: Dataset,
        settings: ViewSettings,
        layouter: L,
    ) -> Result<Self, TopologyError> {
        let adapter = LayoutAdapter::with_layouter(layouter, settings.layout.clone());
        Self::with_adapter(dataset, settings, adapter)
    }

    /// Renders the initial frame. Any failure here is returned as-is since
    /// there is no earlier frame to fall back to.
    pub fn with_adapter(
        dataset: Dataset,
        settings: ViewSettings,
        adapter: LayoutAdapter<L>,
    ) -> Result<Self, TopologyError> {
        let filter = settings.default_filter;
        let collapsed = CollapseSet::new();
        let direction = LayoutDirection::Vertical;
        let converter = NodeGraphConverter::new();

        let pass = RenderPass::start(RenderTrigger::Startup);
        let frame = match compute_frame(&dataset, &collapsed, filter, direction, &adapter, converter)
        {
            Ok(frame) => frame,
            Err(err) => {
                pass.failure(&err.to_string());
                return Err(err);
            }
        };
        pass.success(frame.graph.nodes.len(), frame.graph.edges.len());

        let outbox = Outbox::new();
        outbox.publish(Event::RenderCompleted {
            node_count: frame.graph.nodes.len(),
            edge_count: frame.graph.edges.len(),
        });

        Ok(Self {
            dataset,
            collapsed,
            filter,
            viewport_width: None,
            settings,
            adapter,
            converter,
            outbox,
            frame,
            stale: false,
        })
    }

    /// Render outcomes (`RenderCompleted` / `RenderFailed`).
    pub fn events(&self) -> Receiver<Event> {
        self.outbox.rx.clone()
    }

    pub fn frame(&self) -> &NodeGraph {
        &self.frame.graph
    }

    pub fn positioned(&self) -> &[PositionedNode] {
        &self.frame.positioned
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn collapse_set(&self) -> &CollapseSet {
        &self.collapsed
    }

    pub fn filter(&self) -> CountFilter {
        self.filter
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Desktop layout until a viewport width has been reported.
    pub fn direction(&self) -> LayoutDirection {
        self.viewport_width
            .map(|width| self.settings.direction_for(width))
            .unwrap_or(LayoutDirection::Vertical)
    }

    pub fn legend(&self) -> Legend {
        self.converter.legend(&self.dataset, self.filter)
    }

    /// Flips the collapse flag of `id`. Unknown ids and nodes without
    /// children are ignored and return `Ok(false)`.
    pub fn toggle_collapse(&mut self, id: &NodeId) -> Result<bool, TopologyError> {
        match self.dataset.get(id) {
            Some(node) if node.has_children() => {}
            Some(_) => {
                tracing::debug!("Ignoring toggle of childless node {}", id);
                return Ok(false);
            }
            None => {
                tracing::warn!("Ignoring toggle of unknown node {}", id);
                return Ok(false);
            }
        }

        let collapsed = self.collapsed.toggle(id);
        tracing::debug!("Node {} collapsed={}", id, collapsed);
        self.render(RenderTrigger::ToggleCollapse)?;
        Ok(true)
    }

    /// Replaces the active filter. Positions are reused from the current
    /// layout; only counters change.
    pub fn set_filter(&mut self, filter: CountFilter) -> Result<(), TopologyError> {
        self.filter = filter;
        if self.stale {
            return self.render(RenderTrigger::SetFilter);
        }

        let pass = RenderPass::start(RenderTrigger::SetFilter);
        for positioned in &mut self.frame.positioned {
            positioned.node.filter = filter;
        }
        self.frame.graph = self.converter.convert(
            &self.frame.positioned,
            &self.frame.edges,
            self.frame.graph.direction,
            filter,
        );
        self.completed(pass);
        Ok(())
    }

    /// Records the viewport width. Only a change of layout direction
    /// triggers a new pass.
    pub fn resize(&mut self, width: f32) -> Result<(), TopologyError> {
        let before = self.direction();
        self.viewport_width = Some(width);
        if self.direction() == before && !self.stale {
            return Ok(());
        }
        self.render(RenderTrigger::Resize)
    }

    pub fn expand_all(&mut self) -> Result<(), TopologyError> {
        self.collapsed.clear();
        self.render(RenderTrigger::ExpandAll)
    }

    /// Collapses every node with children except the root, leaving the
    /// root and its direct children on screen.
    pub fn collapse_all(&mut self) -> Result<(), TopologyError> {
        let parents: Vec<NodeId> = descendants(&self.dataset, self.dataset.root())?
            .into_iter()
            .filter(|id| self.dataset.get(id).is_some_and(|node| node.has_children()))
            .collect();

        self.collapsed.clear();
        for id in parents {
            self.collapsed.set(id, true);
        }
        self.render(RenderTrigger::CollapseAll)
    }

    fn render(&mut self, trigger: RenderTrigger) -> Result<(), TopologyError> {
        let pass = RenderPass::start(trigger);
        match compute_frame(
            &self.dataset,
            &self.collapsed,
            self.filter,
            self.direction(),
            &self.adapter,
            self.converter,
        ) {
            Ok(frame) => {
                self.frame = frame;
                self.stale = false;
                self.completed(pass);
                Ok(())
            }
            Err(err) => {
                self.stale = true;
                pass.failure(&err.to_string());
                self.outbox.publish(Event::RenderFailed {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn completed(&self, pass: RenderPass) {
        let node_count = self.frame.graph.nodes.len();
        let edge_count = self.frame.graph.edges.len();
        pass.success(node_count, edge_count);
        self.outbox.publish(Event::RenderCompleted {
            node_count,
            edge_count,
        });
    }
}

fn compute_frame<L: Layouter>(
    dataset: &Dataset,
    collapsed: &CollapseSet,
    filter: CountFilter,
    direction: LayoutDirection,
    adapter: &LayoutAdapter<L>,
    converter: NodeGraphConverter,
) -> Result<Frame, TopologyError> {
    let visible = reduce(dataset, collapsed, filter)?;
    let positioned = adapter.layout(&visible, direction)?;
    let graph = converter.convert(&positioned, &visible.edges, direction, filter);
    Ok(Frame {
        positioned,
        edges: visible.edges,
        graph,
    })
}

impl<L: Layouter> EventListener for TopologyController<L> {
    fn handle_event(&mut self, event: &Event) {
        // Failures are already logged and published on the outbox.
        let _ = match event {
            Event::ToggleCollapse { id } => self.toggle_collapse(id).map(|_| ()),
            Event::SetFilter(filter) => self.set_filter(*filter),
            Event::ViewportResized { width } => self.resize(*width),
            Event::ExpandAll => self.expand_all(),
            Event::CollapseAll => self.collapse_all(),
            Event::RenderCompleted { .. } | Event::RenderFailed { .. } => Ok(()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudmap_core::{CloudNode, NodeType};

    fn dataset() -> Dataset {
        Dataset::new(
            "root",
            vec![
                CloudNode::new("root", "Cloud", NodeType::Cloud).with_children(["A", "B"]),
                CloudNode::new("A", "GCP", NodeType::Gcp)
                    .with_counts(120, 3)
                    .with_children(["A1", "A2"]),
                CloudNode::new("B", "SaaS", NodeType::Saas).with_counts(5, 1),
                CloudNode::new("A1", "GKE", NodeType::Service).with_counts(70, 0),
                CloudNode::new("A2", "Storage", NodeType::Service).with_counts(10, 2),
            ],
        )
    }

    fn controller() -> TopologyController {
        TopologyController::new(dataset(), ViewSettings::default()).unwrap()
    }

    fn ids(graph: &NodeGraph) -> Vec<&str> {
        let mut ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_startup_renders_everything() {
        let controller = controller();
        assert_eq!(ids(controller.frame()), vec!["A", "A1", "A2", "B", "root"]);
        assert_eq!(controller.frame().edges.len(), 4);
        assert_eq!(
            controller.events().try_recv().unwrap(),
            Event::RenderCompleted {
                node_count: 5,
                edge_count: 4
            }
        );
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dataset = Dataset::new("nope", vec![CloudNode::new("A", "A", NodeType::Aws)]);
        let err = TopologyController::new(dataset, ViewSettings::default())
            .err()
            .unwrap();
        assert_eq!(err, TopologyError::NotFound(NodeId::from("nope")));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut controller = controller();
        let before = controller.frame().clone();

        assert!(controller.toggle_collapse(&NodeId::from("A")).unwrap());
        assert_eq!(ids(controller.frame()), vec!["A", "B", "root"]);

        assert!(controller.toggle_collapse(&NodeId::from("A")).unwrap());
        assert_eq!(controller.frame(), &before);
    }

    #[test]
    fn test_childless_and_unknown_toggles_are_noops() {
        let mut controller = controller();
        let events = controller.events();
        while events.try_recv().is_ok() {}

        assert!(!controller.toggle_collapse(&NodeId::from("B")).unwrap());
        assert!(!controller.toggle_collapse(&NodeId::from("ghost")).unwrap());
        assert!(controller.collapse_set().collapsed_ids().is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_filter_keeps_positions() {
        let mut controller = controller();
        let before: Vec<_> = controller
            .frame()
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect();

        controller.set_filter(CountFilter::Misconfigurations).unwrap();

        let after: Vec<_> = controller
            .frame()
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect();
        assert_eq!(before, after);
        assert_eq!(controller.frame().filter, CountFilter::Misconfigurations);
        assert!(
            controller
                .positioned()
                .iter()
                .all(|p| p.node.filter == CountFilter::Misconfigurations)
        );
    }

    #[test]
    fn test_resize_switches_direction() {
        let mut controller = controller();
        assert_eq!(controller.direction(), LayoutDirection::Vertical);

        controller.resize(1280.0).unwrap();
        assert_eq!(controller.frame().direction, LayoutDirection::Vertical);

        controller.resize(390.0).unwrap();
        assert_eq!(controller.direction(), LayoutDirection::Horizontal);
        assert_eq!(controller.frame().direction, LayoutDirection::Horizontal);
    }

    #[test]
    fn test_collapse_all_keeps_root_children_visible() {
        let mut controller = controller();
        controller.collapse_all().unwrap();
        assert_eq!(ids(controller.frame()), vec!["A", "B", "root"]);

        controller.expand_all().unwrap();
        assert_eq!(controller.frame().nodes.len(), 5);
    }

    #[test]
    fn test_undrained_outbox_stays_bounded() {
        let mut controller = controller();
        let a = NodeId::from("A");
        for _ in 0..10_000 {
            controller.toggle_collapse(&a).unwrap();
        }

        let events = controller.events();
        assert_eq!(events.len(), OUTBOX_CAPACITY);
        // The newest outcome survives: an even number of toggles leaves A expanded.
        let last = events.try_iter().last().unwrap();
        assert_eq!(
            last,
            Event::RenderCompleted {
                node_count: 5,
                edge_count: 4
            }
        );
    }

    #[test]
    fn test_collapse_all_skips_unreachable_nodes() {
        let dataset = Dataset::new(
            "root",
            vec![
                CloudNode::new("root", "Cloud", NodeType::Cloud).with_children(["A"]),
                CloudNode::new("A", "AWS", NodeType::Aws).with_children(["A1"]),
                CloudNode::new("A1", "EC2", NodeType::Service),
                CloudNode::new("orphan", "Orphan", NodeType::Saas).with_children(["A1"]),
            ],
        );
        let mut controller = TopologyController::new(dataset, ViewSettings::default()).unwrap();
        controller.collapse_all().unwrap();

        assert_eq!(
            controller.collapse_set().collapsed_ids(),
            vec![&NodeId::from("A")]
        );
        assert_eq!(ids(controller.frame()), vec!["A", "root"]);
    }

    #[test]
    fn test_handles_events_from_bus() {
        let mut controller = controller();
        let bus = cloudmap_events::EventBus::new();
        bus.publish(Event::ToggleCollapse {
            id: NodeId::from("A"),
        });
        bus.publish(Event::SetFilter(CountFilter::Alerts));

        bus.dispatch_to(&mut controller);

        assert!(controller.collapse_set().is_collapsed(&NodeId::from("A")));
        assert_eq!(controller.filter(), CountFilter::Alerts);
        assert_eq!(controller.frame().nodes.len(), 3);
    }
}

use cloudmap_core::{CountFilter, NodeId};
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};

pub mod telemetry;

pub use telemetry::{RenderLifecycle, RenderPass, RenderTrigger};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // ========================================================================
    // Interaction
    // ========================================================================
    /// Node clicked: flip its collapsed flag
    ToggleCollapse {
        id: NodeId,
    },
    /// Legend entry clicked
    SetFilter(CountFilter),
    /// Viewport width changed (selects the layout direction)
    ViewportResized {
        width: f32,
    },
    ExpandAll,
    CollapseAll,

    // ========================================================================
    // Render outcome
    // ========================================================================
    RenderCompleted {
        node_count: usize,
        edge_count: usize,
    },
    /// The previous frame is still on screen
    RenderFailed {
        error: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    /// Events the listener publishes while handling are drained in the same call.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

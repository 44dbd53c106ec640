use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

const TELEMETRY_TARGET: &str = "cloudmap::events::telemetry";

/// What triggered a render pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RenderTrigger {
    Startup,
    ToggleCollapse,
    SetFilter,
    Resize,
    ExpandAll,
    CollapseAll,
}

impl fmt::Display for RenderTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::ToggleCollapse => write!(f, "toggle_collapse"),
            Self::SetFilter => write!(f, "set_filter"),
            Self::Resize => write!(f, "resize"),
            Self::ExpandAll => write!(f, "expand_all"),
            Self::CollapseAll => write!(f, "collapse_all"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RenderLifecycle {
    Start,
    Success,
    Failure,
}

impl fmt::Display for RenderLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "render_start"),
            Self::Success => write!(f, "render_success"),
            Self::Failure => write!(f, "render_failure"),
        }
    }
}

/// One render pass, from trigger to outcome.
#[derive(Debug, Clone)]
pub struct RenderPass {
    pub pass_id: String,
    pub trigger: RenderTrigger,
    started: Instant,
}

impl RenderPass {
    pub fn start(trigger: RenderTrigger) -> Self {
        let pass = Self {
            pass_id: Uuid::new_v4().to_string(),
            trigger,
            started: Instant::now(),
        };
        debug!(
            target: TELEMETRY_TARGET,
            pass_id = %pass.pass_id,
            trigger = %pass.trigger,
            lifecycle = %RenderLifecycle::Start,
            "render_start"
        );
        pass
    }

    pub fn elapsed_us(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    pub fn success(self, node_count: usize, edge_count: usize) -> RenderLifecycle {
        info!(
            target: TELEMETRY_TARGET,
            pass_id = %self.pass_id,
            trigger = %self.trigger,
            lifecycle = %RenderLifecycle::Success,
            node_count,
            edge_count,
            duration_us = self.elapsed_us(),
            "render_success"
        );
        RenderLifecycle::Success
    }

    pub fn failure(self, reason: &str) -> RenderLifecycle {
        error!(
            target: TELEMETRY_TARGET,
            pass_id = %self.pass_id,
            trigger = %self.trigger,
            lifecycle = %RenderLifecycle::Failure,
            error = %reason,
            duration_us = self.elapsed_us(),
            "render_failure"
        );
        RenderLifecycle::Failure
    }
}

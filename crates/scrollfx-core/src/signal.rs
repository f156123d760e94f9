//! Signals consumed by the controller and events it emits

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::oneshot;

use crate::dom::ElementId;
use crate::engine::ScrollStatus;
use crate::geometry::Direction;
use crate::navigator::ScrollToRequest;

/// Incoming requests, usually forwarded from page events
#[derive(Debug)]
pub enum ScrollSignal {
    /// Jump back to the top, then re-scan
    Rebuild,
    /// Re-measure everything; the sender fires once done
    Update { done: Option<oneshot::Sender<()>> },
    /// Render against the current registry
    Render,
    ScrollTo(ScrollToRequest),
    /// Delegated click on a scroll-to element
    Click(ElementId),
    /// Window resized; debounced into one update
    Resize,
    /// Per-frame notification from the scroll engine
    Scroll(ScrollStatus),
    Destroy,
}

/// Notifications sent to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrollEvent {
    /// Initial setup finished
    Ready,
    /// A trigger element's callback fired
    Callback(CallbackEvent),
}

/// Structured callback of a trigger element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackEvent {
    pub element: ElementId,
    pub event: String,
    pub options: Map<String, Value>,
    pub direction: Direction,
}

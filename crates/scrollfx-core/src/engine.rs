//! Interface to the external smooth-scrolling engine
//!
//! The engine owns the inertial scroll physics. This crate only reads the
//! virtual scroll offset and limits, asks it to animate to an offset, and
//! listens to its per-frame status notification.

use serde::{Deserialize, Serialize};

/// A 2-D point in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Per-frame status reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollStatus {
    /// Current virtual scroll offset
    pub offset: Vec2,
    /// Maximum scroll offset on each axis
    pub limit: Vec2,
}

/// Callback invoked by the engine on every rendered frame
pub type ScrollListener = Box<dyn FnMut(ScrollStatus) + Send>;

pub trait ScrollEngine {
    /// Current virtual scroll top
    fn scroll_top(&self) -> f64;

    /// Maximum scroll offset
    fn limit(&self) -> Vec2;

    /// Recompute the engine's own geometry (content size changed)
    fn update(&mut self);

    /// Animate to `(x, y)` over `duration_ms`; 0 jumps immediately
    fn scroll_to(&mut self, x: f64, y: f64, duration_ms: u64);

    /// Invert the wheel delta direction
    fn reverse_wheel(&mut self, reversed: bool);

    fn add_listener(&mut self, listener: ScrollListener);

    /// Tear down; drops every listener
    fn destroy(&mut self);
}

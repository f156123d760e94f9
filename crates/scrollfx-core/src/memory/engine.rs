use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::engine::{ScrollEngine, ScrollListener, ScrollStatus, Vec2};

/// Scroll position shared between an engine and the document it scrolls
#[derive(Debug, Clone, Default)]
pub struct ScrollHandle(Arc<AtomicU64>);

impl ScrollHandle {
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// A `scroll_to` call as the engine received it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCall {
    pub x: f64,
    pub y: f64,
    pub duration_ms: u64,
}

/// Engine without physics: every scroll lands immediately
pub struct InMemoryEngine {
    scroll: ScrollHandle,
    limit: Vec2,
    reversed: bool,
    listeners: Vec<ScrollListener>,
    calls: Vec<ScrollCall>,
    updates: usize,
}

impl fmt::Debug for InMemoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryEngine")
            .field("scroll_top", &self.scroll.get())
            .field("limit", &self.limit)
            .field("reversed", &self.reversed)
            .field("listeners", &self.listeners.len())
            .field("calls", &self.calls)
            .finish()
    }
}

impl InMemoryEngine {
    /// `limit_y` is the maximum scroll top
    pub fn new(limit_y: f64) -> Self {
        Self {
            scroll: ScrollHandle::default(),
            limit: Vec2::new(0.0, limit_y.max(0.0)),
            reversed: false,
            listeners: Vec::new(),
            calls: Vec::new(),
            updates: 0,
        }
    }

    pub fn scroll_handle(&self) -> ScrollHandle {
        self.scroll.clone()
    }

    pub fn set_limit(&mut self, limit_y: f64) {
        self.limit.y = limit_y.max(0.0);
    }

    pub fn status(&self) -> ScrollStatus {
        ScrollStatus {
            offset: Vec2::new(0.0, self.scroll.get()),
            limit: self.limit,
        }
    }

    /// Move as a user wheel/drag would, notifying listeners
    pub fn wheel_to(&mut self, y: f64) {
        self.scroll.set(y.clamp(0.0, self.limit.y));
        self.notify();
    }

    pub fn calls(&self) -> &[ScrollCall] {
        &self.calls
    }

    pub fn update_count(&self) -> usize {
        self.updates
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self) {
        let status = self.status();
        for listener in self.listeners.iter_mut() {
            listener(status);
        }
    }
}

impl ScrollEngine for InMemoryEngine {
    fn scroll_top(&self) -> f64 {
        self.scroll.get()
    }

    fn limit(&self) -> Vec2 {
        self.limit
    }

    fn update(&mut self) {
        self.updates += 1;
    }

    fn scroll_to(&mut self, x: f64, y: f64, duration_ms: u64) {
        self.calls.push(ScrollCall { x, y, duration_ms });
        self.wheel_to(y);
    }

    fn reverse_wheel(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    fn add_listener(&mut self, listener: ScrollListener) {
        self.listeners.push(listener);
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_scroll_clamps_and_notifies() {
        let mut engine = InMemoryEngine::new(1000.0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        engine.add_listener(Box::new(move |status| sink.lock().unwrap().push(status.offset.y)));

        engine.scroll_to(0.0, 1500.0, 800);
        engine.wheel_to(-20.0);

        assert_eq!(*seen.lock().unwrap(), vec![1000.0, 0.0]);
        assert_eq!(engine.calls().len(), 1);
        assert_eq!(engine.calls()[0].duration_ms, 800);

        engine.destroy();
        engine.wheel_to(10.0);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_handle_is_shared() {
        let mut engine = InMemoryEngine::new(500.0);
        let handle = engine.scroll_handle();
        engine.wheel_to(250.0);
        assert_eq!(handle.get(), 250.0);
    }
}

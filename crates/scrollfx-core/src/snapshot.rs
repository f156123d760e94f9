/// Scroll position and viewport measurements shared by one render pass
///
/// Only the render loop writes it; the trigger and parallax passes read it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSnapshot {
    /// Virtual scroll top for the current pass
    pub scroll_top: f64,
    /// Engine scroll top recorded by the last render
    pub last_scroll_y: f64,
    pub window_height: f64,
    /// `window_height / 2`
    pub window_middle: f64,
    /// Engine scroll limit plus window height
    pub scrollable_limit: f64,
}

impl ScrollSnapshot {
    pub fn new(window_height: f64, engine_limit_y: f64) -> Self {
        let mut snapshot = Self::default();
        snapshot.set_window_height(window_height);
        snapshot.set_limit(engine_limit_y);
        snapshot
    }

    /// Same snapshot with both scroll readings at `scroll_top`
    pub fn at(mut self, scroll_top: f64) -> Self {
        self.scroll_top = scroll_top;
        self.last_scroll_y = scroll_top;
        self
    }

    pub fn set_window_height(&mut self, window_height: f64) {
        let engine_limit_y = self.scrollable_limit - self.window_height;
        self.window_height = window_height;
        self.window_middle = window_height / 2.0;
        self.scrollable_limit = engine_limit_y + window_height;
    }

    pub fn set_limit(&mut self, engine_limit_y: f64) {
        self.scrollable_limit = engine_limit_y + self.window_height;
    }

    #[inline]
    pub fn scroll_bottom(&self) -> f64 {
        self.scroll_top + self.window_height
    }

    #[inline]
    pub fn scroll_middle(&self) -> f64 {
        self.scroll_top + self.window_middle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_bounds() {
        let snapshot = ScrollSnapshot::new(800.0, 2200.0).at(1000.0);
        assert_eq!(snapshot.window_middle, 400.0);
        assert_eq!(snapshot.scrollable_limit, 3000.0);
        assert_eq!(snapshot.scroll_bottom(), 1800.0);
        assert_eq!(snapshot.scroll_middle(), 1400.0);
    }

    #[test]
    fn test_window_resize_keeps_engine_limit() {
        let mut snapshot = ScrollSnapshot::new(800.0, 2200.0);
        snapshot.set_window_height(600.0);
        assert_eq!(snapshot.window_middle, 300.0);
        assert_eq!(snapshot.scrollable_limit, 2800.0);
    }
}

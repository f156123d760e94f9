use crate::config::DEFAULT_INVIEW_CLASS;
use crate::dom::ElementId;

use super::attributes::{Anchor, CallbackSpec};

/// An element whose visibility against the scroll position is tracked
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerElement {
    pub target: ElementId,
    /// Scroll position at which the element enters view
    pub offset: f64,
    /// Scroll position at which it leaves view, or the pin boundary
    pub limit: f64,
    pub inview_class: String,
    pub repeat: bool,
    pub sticky: bool,
    pub callback: Option<CallbackSpec>,
    /// Last evaluated visibility
    pub in_view: bool,
    /// Whether the class has ever been added
    pub shown: bool,
    /// Sticky pin state, only meaningful while `sticky`
    pub pinned: bool,
}

impl TriggerElement {
    pub fn new(target: ElementId, offset: f64, limit: f64, inview_class: impl Into<String>) -> Self {
        Self {
            target,
            offset,
            limit,
            inview_class: inview_class.into(),
            repeat: false,
            sticky: false,
            callback: None,
            in_view: false,
            shown: false,
            pinned: false,
        }
    }
}

/// An element translated in proportion to the scroll position
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxElement {
    pub target: ElementId,
    /// Signed intensity; the sign flips direction
    pub speed: f64,
    pub position: Anchor,
    pub horizontal: bool,
    /// Document top edge
    pub offset: f64,
    /// Document bottom edge
    pub limit: f64,
    /// Midpoint between `offset` and `limit`
    pub middle: f64,
    pub inview_class: String,
    pub repeat: bool,
    pub callback: Option<CallbackSpec>,
    /// Last evaluated visibility
    pub in_view: bool,
    /// Whether the class has ever been added
    pub shown: bool,
}

impl ParallaxElement {
    pub fn new(target: ElementId, speed: f64, offset: f64, limit: f64) -> Self {
        Self {
            target,
            speed,
            position: Anchor::default(),
            horizontal: false,
            offset,
            limit,
            middle: midpoint(offset, limit),
            inview_class: DEFAULT_INVIEW_CLASS.to_string(),
            repeat: false,
            callback: None,
            in_view: false,
            shown: false,
        }
    }

    pub fn with_position(mut self, position: Anchor) -> Self {
        self.position = position;
        self
    }

    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }
}

pub fn midpoint(offset: f64, limit: f64) -> f64 {
    (limit - offset) / 2.0 + offset
}

/// The two classified element collections of one scan generation
///
/// A registry is built whole by the scanner and swapped in with a single
/// assignment; it is never edited element by element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    pub triggers: Vec<TriggerElement>,
    pub parallax: Vec<ParallaxElement>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty() && self.parallax.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triggers.len() + self.parallax.len()
    }

    pub fn trigger(&self, element: ElementId) -> Option<&TriggerElement> {
        self.triggers.iter().find(|t| t.target == element)
    }

    pub fn parallax_element(&self, element: ElementId) -> Option<&ParallaxElement> {
        self.parallax.iter().find(|p| p.target == element)
    }

    pub fn clear(&mut self) {
        self.triggers.clear();
        self.parallax.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallax_middle() {
        let el = ParallaxElement::new(ElementId(1), 0.5, 1000.0, 1400.0);
        assert_eq!(el.middle, 1200.0);
        assert_eq!(el.position, Anchor::Middle);
        assert_eq!(el.inview_class, "is-show");
        assert!(!el.in_view && el.callback.is_none());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry
            .triggers
            .push(TriggerElement::new(ElementId(1), 0.0, 100.0, "is-show"));
        registry
            .parallax
            .push(ParallaxElement::new(ElementId(2), 0.2, 0.0, 100.0));

        assert_eq!(registry.len(), 2);
        assert!(registry.trigger(ElementId(1)).is_some());
        assert!(registry.trigger(ElementId(2)).is_none());
        assert!(registry.parallax_element(ElementId(2)).is_some());

        registry.clear();
        assert!(registry.is_empty());
    }
}

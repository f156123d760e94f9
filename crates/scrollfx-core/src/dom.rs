//! Element metadata source
//!
//! The engine never talks to a real DOM. Everything it needs to know about an
//! element (data attributes, bounding box, class list) and everything it writes
//! back (classes, the translate transform) goes through the [`Document`] trait.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Opaque identity of an element inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bounding box of an element as currently laid out on screen
///
/// `top` is relative to the scroll content's visible origin, so a document
/// coordinate is `top + scroll_top`. It already includes any translation
/// applied to the element or its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub top: f64,
    /// Height including padding and border
    pub outer_height: f64,
    /// Content height
    pub height: f64,
}

/// A 3-axis translation in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Translate {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Translation along X only
    pub fn horizontal(x: f64) -> Self {
        Self::new(x, 0.0, 0.0)
    }

    /// Translation along Y only
    pub fn vertical(y: f64) -> Self {
        Self::new(0.0, y, 0.0)
    }

    /// CSS value, e.g. `translate3d(0px, -120px, 0px)`
    pub fn to_css(&self) -> String {
        format!("translate3d({}px, {}px, {}px)", self.x, self.y, self.z)
    }
}

impl fmt::Display for Translate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Read/write access to the page the engine animates
///
/// Selectors and references are opaque strings interpreted by the
/// implementation. Mutations return [`crate::Error::ElementNotFound`] when the
/// element has been detached.
pub trait Document {
    /// All elements matching `selector`, in document order
    fn query(&self, selector: &str) -> Vec<ElementId>;

    /// Elements a target reference (`data-target`, `href`) points at
    fn resolve(&self, reference: &str) -> Vec<ElementId>;

    /// Descendants of `element` matching `selector`, in document order
    fn descendants(&self, element: ElementId, selector: &str) -> Vec<ElementId>;

    /// Whether `element` itself matches `selector`
    fn matches(&self, element: ElementId, selector: &str) -> bool;

    /// Value of the `data-<key>` attribute. `Some("")` means present without value.
    fn data(&self, element: ElementId, key: &str) -> Option<String>;

    /// Value of a plain attribute such as `href`
    fn attr(&self, element: ElementId, name: &str) -> Option<String>;

    /// Current bounding box, `None` for detached elements
    fn bounds(&self, element: ElementId) -> Option<Bounds>;

    /// Total height of the scroll content
    fn content_height(&self) -> f64;

    /// Height of the window the content scrolls in
    fn window_height(&self) -> f64;

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    fn add_class(&mut self, element: ElementId, class: &str) -> Result<()>;

    fn remove_class(&mut self, element: ElementId, class: &str) -> Result<()>;

    /// Set the element's `transform` style; `None` clears it
    fn set_transform(&mut self, element: ElementId, translate: Option<Translate>) -> Result<()>;

    /// Toggle a class on the document root
    fn set_root_class(&mut self, class: &str, enabled: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_css() {
        assert_eq!(
            Translate::vertical(-120.5).to_css(),
            "translate3d(0px, -120.5px, 0px)"
        );
        assert_eq!(Translate::horizontal(40.0).to_string(), "translate3d(40px, 0px, 0px)");
    }
}

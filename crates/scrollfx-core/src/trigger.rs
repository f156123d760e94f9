//! Viewport-entry triggers and sticky pinning

use tracing::{debug, warn};

use crate::dom::{Document, ElementId, Translate};
use crate::geometry::{CallbackSpec, Direction, ParallaxElement, TriggerElement};
use crate::signal::CallbackEvent;
use crate::snapshot::ScrollSnapshot;
use crate::transform::{TransformApplicator, TransformStore};
use crate::Result;

/// Result of evaluating one trigger element
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub in_view: bool,
    pub changed: bool,
    /// Callback to deliver, when the transition matched its direction
    pub callback: Option<CallbackEvent>,
}

/// Any part of the element is inside the viewport
pub fn is_in_view(element: &TriggerElement, snapshot: &ScrollSnapshot) -> bool {
    in_viewport(element.offset, element.limit, snapshot)
}

fn in_viewport(offset: f64, limit: f64, snapshot: &ScrollSnapshot) -> bool {
    snapshot.scroll_bottom() >= offset && snapshot.scroll_top <= limit
}

/// Class and callback bookkeeping of one element, borrowed from its record
struct Visibility<'a> {
    target: ElementId,
    inview_class: &'a str,
    repeat: bool,
    callback: Option<&'a CallbackSpec>,
    in_view: &'a mut bool,
    shown: &'a mut bool,
}

impl Visibility<'_> {
    /// Apply a visibility reading; returns whether it changed and the callback to deliver
    fn update<D: Document + ?Sized>(
        self,
        doc: &mut D,
        in_view: bool,
    ) -> Result<(bool, Option<CallbackEvent>)> {
        if in_view == *self.in_view {
            return Ok((false, None));
        }

        let direction = if in_view {
            doc.add_class(self.target, self.inview_class)?;
            *self.shown = true;
            Direction::Enter
        } else {
            // Non-repeating elements keep the class once shown
            if self.repeat {
                doc.remove_class(self.target, self.inview_class)?;
            }
            Direction::Leave
        };
        *self.in_view = in_view;

        let callback = self
            .callback
            .filter(|spec| spec.way().matches(direction))
            .map(|spec| CallbackEvent {
                element: self.target,
                event: spec.event.clone(),
                options: spec.options.clone(),
                direction,
            });
        Ok((true, callback))
    }
}

/// Scroll top lies inside the sticky band `[offset, limit]`
pub fn in_sticky_band(element: &TriggerElement, snapshot: &ScrollSnapshot) -> bool {
    snapshot.scroll_top >= element.offset && snapshot.scroll_top <= element.limit
}

#[derive(Debug, Clone)]
pub struct ViewportTrigger {
    applicator: TransformApplicator,
    sticky_class: String,
}

impl ViewportTrigger {
    pub fn new(applicator: TransformApplicator, sticky_class: impl Into<String>) -> Self {
        Self {
            applicator,
            sticky_class: sticky_class.into(),
        }
    }

    /// Update classes, pin state and visibility of one element
    ///
    /// The element's recorded state only changes once the document accepted
    /// the corresponding write, so a failed element is retried next pass.
    pub fn evaluate<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        store: &mut TransformStore,
        element: &mut TriggerElement,
        snapshot: &ScrollSnapshot,
    ) -> Result<Evaluation> {
        let in_view = is_in_view(element, snapshot);
        let (changed, callback) = Visibility {
            target: element.target,
            inview_class: &element.inview_class,
            repeat: element.repeat,
            callback: element.callback.as_ref(),
            in_view: &mut element.in_view,
            shown: &mut element.shown,
        }
        .update(doc, in_view)?;

        if element.sticky {
            self.update_pin(doc, store, element, snapshot)?;
        }

        Ok(Evaluation {
            in_view,
            changed,
            callback,
        })
    }

    fn update_pin<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        store: &mut TransformStore,
        element: &mut TriggerElement,
        snapshot: &ScrollSnapshot,
    ) -> Result<()> {
        if in_sticky_band(element, snapshot) {
            // Re-applied every pass to hold the element while content scrolls
            let hold = Translate::vertical(snapshot.scroll_top - element.offset);
            self.applicator.apply(doc, store, element.target, hold)?;
            if !element.pinned {
                doc.add_class(element.target, &self.sticky_class)?;
                element.pinned = true;
                debug!(element = %element.target, "Pinned sticky element");
            }
        } else if element.pinned {
            self.applicator.clear(doc, store, element.target)?;
            doc.remove_class(element.target, &self.sticky_class)?;
            element.pinned = false;
            debug!(element = %element.target, "Unpinned sticky element");
        }
        Ok(())
    }

    /// In-view class and callback of a parallax element
    ///
    /// Parallax elements toggle like trigger elements but are never pinned.
    pub fn toggle_parallax<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        element: &mut ParallaxElement,
        snapshot: &ScrollSnapshot,
    ) -> Result<Option<CallbackEvent>> {
        let in_view = in_viewport(element.offset, element.limit, snapshot);
        let (_, callback) = Visibility {
            target: element.target,
            inview_class: &element.inview_class,
            repeat: element.repeat,
            callback: element.callback.as_ref(),
            in_view: &mut element.in_view,
            shown: &mut element.shown,
        }
        .update(doc, in_view)?;
        Ok(callback)
    }

    /// Toggle every parallax element, collecting callbacks in registry order
    pub fn run_parallax<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        elements: &mut [ParallaxElement],
        snapshot: &ScrollSnapshot,
    ) -> Vec<CallbackEvent> {
        let mut callbacks = Vec::new();
        for element in elements.iter_mut() {
            match self.toggle_parallax(doc, element, snapshot) {
                Ok(callback) => callbacks.extend(callback),
                Err(e) => warn!(element = %element.target, "Parallax toggle failed: {}", e),
            }
        }
        callbacks
    }

    /// Evaluate every element, collecting callbacks in registry order
    ///
    /// A failing element is logged and skipped.
    pub fn run<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        store: &mut TransformStore,
        elements: &mut [TriggerElement],
        snapshot: &ScrollSnapshot,
    ) -> Vec<CallbackEvent> {
        let mut callbacks = Vec::new();
        for element in elements.iter_mut() {
            match self.evaluate(doc, store, element, snapshot) {
                Ok(evaluation) => callbacks.extend(evaluation.callback),
                Err(e) => warn!(element = %element.target, "Trigger evaluation failed: {}", e),
            }
        }
        callbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryDocument, NodeSpec};

    struct Fixture {
        doc: InMemoryDocument,
        store: TransformStore,
        trigger: ViewportTrigger,
        element: TriggerElement,
    }

    fn fixture(repeat: bool) -> Fixture {
        let mut doc = InMemoryDocument::new(800.0);
        let id = doc.insert(None, NodeSpec::new(1000.0, 200.0).class("js-animate"));
        let mut element = TriggerElement::new(id, 1000.0, 1200.0, "is-show");
        element.repeat = repeat;
        Fixture {
            doc,
            store: TransformStore::new(),
            trigger: ViewportTrigger::new(TransformApplicator::new(".js-animate"), "is-sticky"),
            element,
        }
    }

    fn at(scroll_top: f64) -> ScrollSnapshot {
        ScrollSnapshot::new(800.0, 2200.0).at(scroll_top)
    }

    impl Fixture {
        fn eval(&mut self, scroll_top: f64) -> Evaluation {
            self.trigger
                .evaluate(&mut self.doc, &mut self.store, &mut self.element, &at(scroll_top))
                .unwrap()
        }

        fn shown(&self) -> bool {
            self.doc.has_class(self.element.target, "is-show")
        }
    }

    #[test]
    fn test_enter_adds_class() {
        let mut f = fixture(false);
        let e = f.eval(0.0);
        assert!(!e.in_view && !e.changed);
        assert!(!f.shown());

        // Bottom edge of the viewport reaches the element
        let e = f.eval(200.0);
        assert!(e.in_view && e.changed);
        assert!(f.shown());

        let e = f.eval(300.0);
        assert!(e.in_view && !e.changed);
    }

    #[test]
    fn test_non_repeating_keeps_class() {
        let mut f = fixture(false);
        f.eval(1000.0);
        assert!(f.shown());

        let e = f.eval(1300.0);
        assert!(!e.in_view && e.changed);
        assert!(f.shown());
        f.eval(0.0);
        assert!(f.shown());
    }

    #[test]
    fn test_repeating_removes_class() {
        let mut f = fixture(true);
        f.eval(1000.0);
        assert!(f.shown());

        f.eval(1300.0);
        assert!(!f.shown());

        f.eval(1100.0);
        assert!(f.shown());
    }

    #[test]
    fn test_callback_direction() {
        let mut f = fixture(true);
        f.element.callback = Some(CallbackSpec::parse("reveal:{id: 3}").unwrap());

        let enter = f.eval(1000.0).callback.unwrap();
        assert_eq!(enter.event, "reveal");
        assert_eq!(enter.direction, Direction::Enter);
        assert_eq!(enter.options.get("id"), Some(&serde_json::json!(3)));

        // Default way only fires on enter
        assert!(f.eval(1300.0).callback.is_none());
        // No transition, no callback
        assert!(f.eval(1300.0).callback.is_none());
    }

    #[test]
    fn test_callback_on_leave() {
        let mut f = fixture(true);
        f.element.callback = Some(CallbackSpec::parse("hide:{way: \"leave\"}").unwrap());

        assert!(f.eval(1000.0).callback.is_none());
        let leave = f.eval(1300.0).callback.unwrap();
        assert_eq!(leave.direction, Direction::Leave);
    }

    #[test]
    fn test_sticky_pin_and_unpin() {
        let mut f = fixture(false);
        f.element.sticky = true;
        f.element.limit = 1600.0;
        let id = f.element.target;

        f.eval(900.0);
        assert!(!f.element.pinned);
        assert_eq!(f.doc.transform(id), None);

        f.eval(1100.0);
        assert!(f.element.pinned);
        assert!(f.doc.has_class(id, "is-sticky"));
        assert_eq!(f.doc.transform(id), Some(Translate::vertical(100.0)));

        f.eval(1250.0);
        assert_eq!(f.doc.transform(id), Some(Translate::vertical(250.0)));
        assert_eq!(f.store.translate(id), Some(Translate::vertical(250.0)));

        f.eval(1700.0);
        assert!(!f.element.pinned);
        assert!(!f.doc.has_class(id, "is-sticky"));
        assert_eq!(f.doc.transform(id), None);
        assert!(f.store.get(id).is_none());
    }

    #[test]
    fn test_parallax_element_toggles_class_and_callback() {
        let mut f = fixture(false);
        let mut layer = ParallaxElement::new(f.element.target, 0.5, 1000.0, 1400.0);
        layer.repeat = true;
        layer.callback = Some(CallbackSpec::parse("drift:{a: 1, way: \"both\"}").unwrap());

        let enter = f
            .trigger
            .toggle_parallax(&mut f.doc, &mut layer, &at(1000.0))
            .unwrap()
            .unwrap();
        assert_eq!((enter.event.as_str(), enter.direction), ("drift", Direction::Enter));
        assert!(f.shown() && layer.in_view && layer.shown);

        // Still in view: nothing new
        let again = f.trigger.toggle_parallax(&mut f.doc, &mut layer, &at(1100.0));
        assert!(again.unwrap().is_none());

        let leave = f
            .trigger
            .toggle_parallax(&mut f.doc, &mut layer, &at(1500.0))
            .unwrap()
            .unwrap();
        assert_eq!(leave.direction, Direction::Leave);
        assert!(!f.shown());
        // Never pinned, never translated
        assert_eq!(f.doc.transform(layer.target), None);
    }

    #[test]
    fn test_run_parallax_skips_failing_element() {
        let mut f = fixture(false);
        let mut elements = vec![
            ParallaxElement::new(ElementId(77), 0.5, 0.0, 2000.0),
            ParallaxElement::new(f.element.target, 0.5, 1000.0, 1400.0),
        ];
        let callbacks = f.trigger.run_parallax(&mut f.doc, &mut elements, &at(1000.0));

        assert!(callbacks.is_empty());
        assert!(!elements[0].in_view);
        assert!(elements[1].in_view);
        assert!(f.shown());
    }

    #[test]
    fn test_run_skips_failing_element() {
        let mut f = fixture(false);
        let mut elements = vec![
            TriggerElement::new(ElementId(77), 0.0, 2000.0, "is-show"),
            f.element.clone(),
        ];
        let callbacks = f
            .trigger
            .run(&mut f.doc, &mut f.store, &mut elements, &at(1000.0));

        assert!(callbacks.is_empty());
        assert!(!elements[0].in_view);
        assert!(elements[1].in_view);
        assert!(f.doc.has_class(elements[1].target, "is-show"));
    }
}

//! Element discovery and static trigger geometry
//!
//! Geometry is measured once per scan, in document coordinates, so the render
//! passes only compare numbers against the scroll position.

use tracing::{debug, warn};

use crate::config::TriggerConfig;
use crate::dom::{Bounds, Document, ElementId};
use crate::transform::TransformStore;
use crate::Result;

use super::attributes::ElementConfig;
use super::registry::{midpoint, ParallaxElement, Registry, TriggerElement};

#[derive(Debug, Clone)]
pub struct GeometryScanner {
    selector: String,
    inview_class: String,
    sticky_class: String,
}

impl GeometryScanner {
    pub fn new(selector: impl Into<String>, trigger: &TriggerConfig) -> Self {
        Self {
            selector: selector.into(),
            inview_class: trigger.inview_class.clone(),
            sticky_class: trigger.sticky_class.clone(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Scan every eligible element into a fresh registry
    ///
    /// `scroll_top` is the engine's scroll position at measurement time. A
    /// malformed callback descriptor aborts the whole scan. Sticky elements
    /// still need one trigger evaluation to settle their initial pin state.
    pub fn scan<D: Document + ?Sized>(
        &self,
        doc: &D,
        store: &TransformStore,
        scroll_top: f64,
    ) -> Result<Registry> {
        let mut registry = Registry::new();

        for element in doc.query(&self.selector) {
            let config = ElementConfig::read(doc, element)?;
            self.classify(doc, store, scroll_top, element, config, &mut registry);
        }

        debug!(
            triggers = registry.triggers.len(),
            parallax = registry.parallax.len(),
            "Scanned elements"
        );
        Ok(registry)
    }

    fn classify<D: Document + ?Sized>(
        &self,
        doc: &D,
        store: &TransformStore,
        scroll_top: f64,
        element: ElementId,
        config: ElementConfig,
        registry: &mut Registry,
    ) {
        let own = doc.bounds(element).unwrap_or_default();
        let measured = match &config.target {
            Some(reference) => first_bounds(doc, reference).unwrap_or_else(|| {
                debug!(%element, reference, "Target resolved to nothing, using zero height");
                Bounds {
                    top: own.top,
                    outer_height: 0.0,
                    height: 0.0,
                }
            }),
            None => own,
        };

        let mut offset = measured.top + scroll_top;
        let mut limit = offset + measured.outer_height;

        // Undo a translation we applied earlier so re-scans measure the same box
        if config.target.is_none() {
            if let Some(translate) = store.translate(element) {
                offset -= translate.y;
            }
        }

        if config.sticky {
            limit = match &config.sticky_target {
                None => doc.content_height(),
                Some(reference) => match first_bounds(doc, reference) {
                    Some(stop) => stop.top - own.height + scroll_top,
                    None => {
                        warn!(%element, reference, "Sticky target not found, pinning to content end");
                        doc.content_height()
                    }
                },
            };
        }

        let inview_class = config
            .inview_class
            .unwrap_or_else(|| self.inview_class.clone());
        let shown = doc.has_class(element, &inview_class);

        if let Some(speed) = config.speed {
            registry.parallax.push(ParallaxElement {
                target: element,
                speed,
                position: config.position,
                horizontal: config.horizontal,
                offset,
                limit,
                middle: midpoint(offset, limit),
                inview_class,
                repeat: config.repeat,
                callback: config.callback,
                in_view: shown,
                shown,
            });
            return;
        }

        registry.triggers.push(TriggerElement {
            target: element,
            offset: offset.round(),
            limit,
            in_view: shown,
            shown,
            pinned: config.sticky && doc.has_class(element, &self.sticky_class),
            inview_class,
            repeat: config.repeat,
            sticky: config.sticky,
            callback: config.callback,
        });
    }
}

fn first_bounds<D: Document + ?Sized>(doc: &D, reference: &str) -> Option<Bounds> {
    doc.resolve(reference)
        .into_iter()
        .find_map(|target| doc.bounds(target))
}

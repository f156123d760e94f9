//! Parallax distance computation
//!
//! Each element's translation is derived from the scroll snapshot with one of
//! three anchor formulas. Off-screen elements are pre-positioned on the first
//! render so they don't snap into place on the first scroll.

use tracing::{debug, warn};

use crate::dom::{Document, Translate};
use crate::geometry::{Anchor, ParallaxElement};
use crate::snapshot::ScrollSnapshot;

use super::applicator::{TransformApplicator, TransformStore};

/// In-view test for parallax elements
///
/// The bottom edge uses the current virtual scroll top while the limit is
/// compared against the scroll Y of the last render. The two readings differ
/// when the engine's status and its scroll top disagree.
pub fn is_in_view(element: &ParallaxElement, snapshot: &ScrollSnapshot) -> bool {
    snapshot.scroll_bottom() >= element.offset && snapshot.last_scroll_y <= element.limit
}

/// Translation distance for this pass, `None` when the element keeps its transform
pub fn compute_distance(
    element: &ParallaxElement,
    snapshot: &ScrollSnapshot,
    first_render: bool,
) -> Option<f64> {
    // A zero speed never moves the element
    if element.speed == 0.0 {
        return None;
    }

    let speed = element.speed;
    let in_view = is_in_view(element, snapshot);

    let distance = if in_view {
        match element.position {
            Anchor::Top => snapshot.scroll_top * -speed,
            Anchor::Bottom => (snapshot.scrollable_limit - snapshot.scroll_bottom()) * speed,
            Anchor::Middle => (snapshot.scroll_middle() - element.middle) * -speed,
        }
    } else if first_render && element.position != Anchor::Top {
        (element.offset - snapshot.window_middle - element.middle) * -speed
    } else {
        return None;
    };

    Some(distance)
}

/// Translation along the element's axis
pub fn translation(element: &ParallaxElement, distance: f64) -> Translate {
    if element.horizontal {
        Translate::horizontal(distance)
    } else {
        Translate::vertical(distance)
    }
}

/// Outcome of one parallax pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub applied: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Runs the parallax pass over every element of a registry generation
#[derive(Debug, Clone)]
pub struct ParallaxTransformer {
    applicator: TransformApplicator,
}

impl ParallaxTransformer {
    pub fn new(applicator: TransformApplicator) -> Self {
        Self { applicator }
    }

    /// Compute and apply distances in registry order
    ///
    /// A failure on one element is logged and does not stop the pass.
    pub fn run<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        store: &mut TransformStore,
        elements: &[ParallaxElement],
        snapshot: &ScrollSnapshot,
        first_render: bool,
    ) -> PassReport {
        let mut report = PassReport::default();

        for element in elements {
            let Some(distance) = compute_distance(element, snapshot, first_render) else {
                report.unchanged += 1;
                continue;
            };

            if !distance.is_finite() {
                warn!(element = %element.target, distance, "Skipping non-finite parallax distance");
                report.failed += 1;
                continue;
            }

            match self
                .applicator
                .apply(doc, store, element.target, translation(element, distance))
            {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    warn!(element = %element.target, "Parallax transform failed: {}", e);
                    report.failed += 1;
                }
            }
        }

        debug!(
            applied = report.applied,
            unchanged = report.unchanged,
            failed = report.failed,
            "Parallax pass"
        );
        report
    }
}

//! Scroll-to requests
//!
//! A request is resolved to an absolute offset right away and then held as a
//! scheduled task until its delay has elapsed. Tasks are keyed by a monotonic
//! ticket so they can be cancelled one by one or all at once on teardown.
//! Overlapping requests are not coalesced; each one fires on its own.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::dom::{Document, ElementId};
use crate::engine::ScrollEngine;

/// Where to scroll, and how
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollToRequest {
    /// Element to bring to the top of the viewport
    pub target: Option<ElementId>,
    /// Link-like element whose `data-target` or `href` names the destination
    pub source: Option<ElementId>,
    /// Absolute offset, or extra offset when an element is given
    pub offset: Option<f64>,
    pub delay_ms: u64,
    /// Animation speed; the configured default when absent
    pub speed_ms: Option<u64>,
    pub to_top: bool,
    pub to_bottom: bool,
}

impl ScrollToRequest {
    pub fn to_offset(offset: f64) -> Self {
        Self {
            offset: Some(offset),
            ..Default::default()
        }
    }

    pub fn to_element(target: ElementId) -> Self {
        Self {
            target: Some(target),
            ..Default::default()
        }
    }

    pub fn from_source(source: ElementId) -> Self {
        Self {
            source: Some(source),
            ..Default::default()
        }
    }

    pub fn top() -> Self {
        Self {
            to_top: true,
            ..Default::default()
        }
    }

    pub fn bottom() -> Self {
        Self {
            to_bottom: true,
            ..Default::default()
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_speed(mut self, speed_ms: u64) -> Self {
        self.speed_ms = Some(speed_ms);
        self
    }

    /// Names something to scroll to
    pub fn is_specified(&self) -> bool {
        self.target.is_some()
            || self.source.is_some()
            || self.offset.is_some()
            || self.to_top
            || self.to_bottom
    }
}

/// Handle of a scheduled scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScrollTicket(pub u64);

/// A resolved scroll waiting for its delay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledScroll {
    pub ticket: ScrollTicket,
    pub due: Instant,
    pub y: f64,
    pub speed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ScrollNavigator {
    default_speed_ms: u64,
    next_ticket: u64,
    pending: BTreeMap<ScrollTicket, ScheduledScroll>,
}

impl ScrollNavigator {
    pub fn new(default_speed_ms: u64) -> Self {
        Self {
            default_speed_ms,
            next_ticket: 1,
            pending: BTreeMap::new(),
        }
    }

    /// Absolute offset for a request, `None` when it names nothing
    ///
    /// Precedence: top, bottom, target element, source element, raw offset.
    pub fn resolve<D, E>(&self, request: &ScrollToRequest, doc: &D, engine: &E) -> Option<f64>
    where
        D: Document + ?Sized,
        E: ScrollEngine + ?Sized,
    {
        if !request.is_specified() {
            warn!("Scroll-to request needs a target, a source, an offset or a top/bottom flag");
            return None;
        }

        if request.to_top {
            return Some(0.0);
        }
        if request.to_bottom {
            return Some(engine.limit().y);
        }

        let extra = request.offset.unwrap_or(0.0);
        let element_offset =
            |element: ElementId| doc.bounds(element).map(|b| b.top + engine.scroll_top() + extra);

        if let Some(target) = request.target {
            match element_offset(target) {
                Some(y) => return Some(y),
                None => warn!(%target, "Scroll-to target is not in the document"),
            }
        }

        if let Some(source) = request.source {
            match link_target(doc, source).and_then(element_offset) {
                Some(y) => return Some(y),
                None => warn!(%source, "Scroll-to source does not link to an element"),
            }
        }

        Some(extra)
    }

    /// Resolve and schedule; `None` when the request names nothing
    pub fn scroll_to<D, E>(
        &mut self,
        request: &ScrollToRequest,
        doc: &D,
        engine: &E,
        now: Instant,
    ) -> Option<ScrollTicket>
    where
        D: Document + ?Sized,
        E: ScrollEngine + ?Sized,
    {
        let y = self.resolve(request, doc, engine)?;
        Some(self.schedule(request, y, now))
    }

    pub fn schedule(&mut self, request: &ScrollToRequest, y: f64, now: Instant) -> ScrollTicket {
        let ticket = ScrollTicket(self.next_ticket);
        self.next_ticket += 1;

        let scheduled = ScheduledScroll {
            ticket,
            due: now + Duration::from_millis(request.delay_ms),
            y,
            speed_ms: request.speed_ms.unwrap_or(self.default_speed_ms),
        };
        debug!(ticket = ticket.0, y, delay_ms = request.delay_ms, "Scheduled scroll");
        self.pending.insert(ticket, scheduled);
        ticket
    }

    /// Remove and return every task due at `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<ScheduledScroll> {
        let due: Vec<ScrollTicket> = self
            .pending
            .values()
            .filter(|s| s.due <= now)
            .map(|s| s.ticket)
            .collect();

        let mut fired: Vec<ScheduledScroll> = due
            .into_iter()
            .filter_map(|ticket| self.pending.remove(&ticket))
            .collect();
        fired.sort_by(|a, b| a.due.cmp(&b.due).then(a.ticket.cmp(&b.ticket)));
        fired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|s| s.due).min()
    }

    pub fn cancel(&mut self, ticket: ScrollTicket) -> bool {
        self.pending.remove(&ticket).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Element named by a source's `data-target`, falling back to its `href`
fn link_target<D: Document + ?Sized>(doc: &D, source: ElementId) -> Option<ElementId> {
    let reference = doc
        .data(source, "target")
        .filter(|r| !r.trim().is_empty())
        .or_else(|| doc.attr(source, "href"))?;
    doc.resolve(&reference).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryDocument, InMemoryEngine, NodeSpec};

    struct Page {
        doc: InMemoryDocument,
        engine: InMemoryEngine,
        section: ElementId,
        link: ElementId,
        button: ElementId,
    }

    fn page(scroll_top: f64) -> Page {
        let mut engine = InMemoryEngine::new(3200.0);
        let mut doc = InMemoryDocument::with_scroll(800.0, engine.scroll_handle());
        let section = doc.insert(None, NodeSpec::new(1500.0, 600.0).name("contact"));
        let link = doc.insert(None, NodeSpec::new(0.0, 20.0).attr("href", "#contact"));
        let button = doc.insert(
            None,
            NodeSpec::new(40.0, 20.0)
                .attr("href", "#nowhere")
                .data("target", "#contact"),
        );
        engine.scroll_to(0.0, scroll_top, 0);
        Page {
            doc,
            engine,
            section,
            link,
            button,
        }
    }

    fn nav() -> ScrollNavigator {
        ScrollNavigator::new(800)
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let p = page(0.0);
        let mut nav = nav();
        let request = ScrollToRequest::default().with_delay(100);
        assert_eq!(nav.scroll_to(&request, &p.doc, &p.engine, Instant::now()), None);
        assert_eq!(nav.pending(), 0);
    }

    #[test]
    fn test_precedence() {
        let p = page(300.0);
        let nav = nav();

        let both = ScrollToRequest::bottom().with_offset(42.0);
        assert_eq!(nav.resolve(&both, &p.doc, &p.engine), Some(3200.0));

        let mut top = ScrollToRequest::to_element(p.section);
        top.to_top = true;
        top.to_bottom = true;
        assert_eq!(nav.resolve(&top, &p.doc, &p.engine), Some(0.0));

        assert_eq!(nav.resolve(&ScrollToRequest::to_offset(250.0), &p.doc, &p.engine), Some(250.0));
    }

    #[test]
    fn test_element_offsets_are_absolute() {
        let p = page(300.0);
        let nav = nav();

        let target = ScrollToRequest::to_element(p.section);
        assert_eq!(nav.resolve(&target, &p.doc, &p.engine), Some(1500.0));

        let shifted = ScrollToRequest::to_element(p.section).with_offset(-100.0);
        assert_eq!(nav.resolve(&shifted, &p.doc, &p.engine), Some(1400.0));
    }

    #[test]
    fn test_source_links() {
        let p = page(0.0);
        let nav = nav();

        let via_href = ScrollToRequest::from_source(p.link);
        assert_eq!(nav.resolve(&via_href, &p.doc, &p.engine), Some(1500.0));

        // data-target wins over href
        let via_data = ScrollToRequest::from_source(p.button);
        assert_eq!(nav.resolve(&via_data, &p.doc, &p.engine), Some(1500.0));

        // An unlinked source falls back to the raw offset
        let unlinked = ScrollToRequest::from_source(p.section).with_offset(10.0);
        assert_eq!(nav.resolve(&unlinked, &p.doc, &p.engine), Some(10.0));
    }

    #[test]
    fn test_schedule_and_take_due() {
        let p = page(0.0);
        let mut nav = nav();
        let now = Instant::now();

        let slow = nav
            .scroll_to(&ScrollToRequest::to_offset(100.0).with_delay(50), &p.doc, &p.engine, now)
            .unwrap();
        let fast = nav
            .scroll_to(
                &ScrollToRequest::to_offset(200.0).with_speed(300),
                &p.doc,
                &p.engine,
                now,
            )
            .unwrap();
        assert!(fast > slow);
        assert_eq!(nav.next_deadline(), Some(now));

        let fired = nav.take_due(now);
        assert_eq!(fired.len(), 1);
        assert_eq!((fired[0].ticket, fired[0].y, fired[0].speed_ms), (fast, 200.0, 300));

        assert!(nav.take_due(now + Duration::from_millis(49)).is_empty());
        let fired = nav.take_due(now + Duration::from_millis(50));
        assert_eq!((fired[0].ticket, fired[0].speed_ms), (slow, 800));
        assert_eq!(nav.pending(), 0);
    }

    #[test]
    fn test_overlapping_requests_all_fire() {
        let p = page(0.0);
        let mut nav = nav();
        let now = Instant::now();
        for y in [100.0, 200.0, 300.0] {
            nav.scroll_to(&ScrollToRequest::to_offset(y).with_delay(10), &p.doc, &p.engine, now);
        }
        let ys: Vec<f64> = nav
            .take_due(now + Duration::from_millis(10))
            .iter()
            .map(|s| s.y)
            .collect();
        assert_eq!(ys, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_cancel() {
        let p = page(0.0);
        let mut nav = nav();
        let now = Instant::now();
        let a = nav
            .scroll_to(&ScrollToRequest::top().with_delay(10), &p.doc, &p.engine, now)
            .unwrap();
        nav.scroll_to(&ScrollToRequest::bottom().with_delay(10), &p.doc, &p.engine, now);

        assert!(nav.cancel(a));
        assert!(!nav.cancel(a));
        assert_eq!(nav.cancel_all(), 1);
        assert!(nav.take_due(now + Duration::from_secs(1)).is_empty());
        assert_eq!(nav.next_deadline(), None);
    }
}

//! Render loop and lifecycle
//!
//! [`SmoothScroll`] owns the document, the engine and every piece of state
//! derived from them. All external events funnel into either a full rebuild
//! (scan, swap the registry, render as first call) or a render against the
//! current registry.

use std::future::pending;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::config::ScrollFxConfig;
use crate::debounce::Debouncer;
use crate::dom::{Document, ElementId};
use crate::engine::{ScrollEngine, ScrollStatus};
use crate::geometry::{GeometryScanner, Registry};
use crate::navigator::{ScrollNavigator, ScrollTicket, ScrollToRequest};
use crate::signal::{CallbackEvent, ScrollEvent, ScrollSignal};
use crate::snapshot::ScrollSnapshot;
use crate::transform::{ParallaxTransformer, TransformApplicator, TransformStore};
use crate::trigger::ViewportTrigger;
use crate::Result;

/// What the controller is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    Rendering,
    Destroyed,
}

pub struct SmoothScroll<D, E> {
    doc: D,
    engine: E,
    config: ScrollFxConfig,
    scanner: GeometryScanner,
    parallax: ParallaxTransformer,
    trigger: ViewportTrigger,
    navigator: ScrollNavigator,
    resize: Debouncer,
    registry: Registry,
    transforms: TransformStore,
    snapshot: ScrollSnapshot,
    last_status: Option<ScrollStatus>,
    phase: Phase,
    initialized: bool,
    signal_tx: mpsc::UnboundedSender<ScrollSignal>,
    signal_rx: mpsc::UnboundedReceiver<ScrollSignal>,
    event_tx: Option<mpsc::UnboundedSender<ScrollEvent>>,
}

impl<D: Document, E: ScrollEngine> SmoothScroll<D, E> {
    pub fn new(doc: D, engine: E, config: ScrollFxConfig) -> Self {
        let selector = config.scroll.selector.clone();
        let applicator = TransformApplicator::new(selector.clone());
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        Self {
            scanner: GeometryScanner::new(selector, &config.trigger),
            parallax: ParallaxTransformer::new(applicator.clone()),
            trigger: ViewportTrigger::new(applicator, config.trigger.sticky_class.clone()),
            navigator: ScrollNavigator::new(config.navigator.speed_ms),
            resize: Debouncer::new(config.resize.debounce()),
            registry: Registry::new(),
            transforms: TransformStore::new(),
            snapshot: ScrollSnapshot::default(),
            last_status: None,
            phase: Phase::Idle,
            initialized: false,
            signal_tx,
            signal_rx,
            event_tx: None,
            doc,
            engine,
            config,
        }
    }

    /// Set the channel that receives `Ready` and callback events
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<ScrollEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Sender for feeding signals into [`Self::run`] or [`Self::drain_signals`]
    pub fn signals(&self) -> mpsc::UnboundedSender<ScrollSignal> {
        self.signal_tx.clone()
    }

    fn send_event(&self, event: ScrollEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                warn!("Failed to send scroll event: receiver dropped");
            }
        }
    }

    /// Measure, scan, render once, then start listening to the engine
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            debug!("Already initialized");
            return Ok(());
        }

        self.doc.set_root_class(&self.config.scroll.root_class, true);
        self.set_wheel_direction(self.config.scroll.reversed);
        self.measure_window();
        self.rescan()?;
        self.render(true, None);

        let tx = self.signal_tx.clone();
        self.engine.add_listener(Box::new(move |status| {
            // The receiver only goes away with the controller itself
            let _ = tx.send(ScrollSignal::Scroll(status));
        }));

        self.initialized = true;
        info!(
            triggers = self.registry.triggers.len(),
            parallax = self.registry.parallax.len(),
            "Smooth scroll initialized"
        );
        self.send_event(ScrollEvent::Ready);
        Ok(())
    }

    /// Apply the current scroll position to the registry
    ///
    /// `status` comes from the engine's per-frame notification and, when
    /// given, is the source of the virtual scroll top for this pass.
    pub fn render(&mut self, first_render: bool, status: Option<ScrollStatus>) {
        match self.phase {
            Phase::Destroyed => return,
            Phase::Scanning | Phase::Rendering => {
                debug!(phase = ?self.phase, "Render rejected");
                return;
            }
            Phase::Idle => {}
        }

        if status.is_some() {
            self.last_status = status;
        }

        let engine_top = self.engine.scroll_top();
        self.snapshot.scroll_top = status.map(|s| s.offset.y).unwrap_or(engine_top);
        if self.snapshot.last_scroll_y != engine_top {
            self.snapshot.last_scroll_y = engine_top;
        }

        self.phase = Phase::Rendering;
        let snapshot = self.snapshot;
        self.parallax.run(
            &mut self.doc,
            &mut self.transforms,
            &self.registry.parallax,
            &snapshot,
            first_render,
        );
        let mut callbacks =
            self.trigger
                .run_parallax(&mut self.doc, &mut self.registry.parallax, &snapshot);
        callbacks.extend(self.trigger.run(
            &mut self.doc,
            &mut self.transforms,
            &mut self.registry.triggers,
            &snapshot,
        ));
        self.phase = Phase::Idle;

        self.deliver(callbacks);
    }

    fn deliver(&self, callbacks: Vec<CallbackEvent>) {
        for callback in callbacks {
            debug!(element = %callback.element, event = %callback.event, "Trigger callback");
            self.send_event(ScrollEvent::Callback(callback));
        }
    }

    /// Re-scan, jump back to the top and render as a first call
    pub fn rebuild(&mut self) -> Result<()> {
        if self.phase == Phase::Destroyed {
            return Ok(());
        }
        self.rescan()?;
        self.engine.scroll_to(0.0, 0.0, 0);
        self.render(true, None);
        info!(elements = self.registry.len(), "Rebuilt");
        Ok(())
    }

    /// Re-measure the engine and the window, re-scan without moving, render
    pub fn update(&mut self) -> Result<()> {
        if self.phase == Phase::Destroyed {
            return Ok(());
        }
        self.engine.update();
        self.measure_window();
        self.set_wheel_direction(self.config.scroll.reversed);
        self.rescan()?;
        self.render(true, None);
        debug!(elements = self.registry.len(), "Updated");
        Ok(())
    }

    /// [`Self::update`], then `on_complete`
    pub fn update_then<F: FnOnce()>(&mut self, on_complete: F) -> Result<()> {
        self.update()?;
        on_complete();
        Ok(())
    }

    fn measure_window(&mut self) {
        self.snapshot.set_window_height(self.doc.window_height());
        self.snapshot.set_limit(self.engine.limit().y);
    }

    /// Build a complete registry, then swap it in
    ///
    /// On failure the previous registry stays in place.
    fn rescan(&mut self) -> Result<()> {
        let scroll_top = self.engine.scroll_top();

        self.phase = Phase::Scanning;
        let scanned = self.scanner.scan(&self.doc, &self.transforms, scroll_top);
        self.phase = Phase::Idle;
        let mut registry = scanned?;

        // Sticky elements start with their pin state settled
        let snapshot = self.snapshot.at(scroll_top);
        let mut callbacks = Vec::new();
        for element in registry.triggers.iter_mut().filter(|t| t.sticky) {
            match self
                .trigger
                .evaluate(&mut self.doc, &mut self.transforms, element, &snapshot)
            {
                Ok(evaluation) => callbacks.extend(evaluation.callback),
                Err(e) => warn!(element = %element.target, "Sticky setup failed: {}", e),
            }
        }

        self.registry = registry;
        self.deliver(callbacks);
        Ok(())
    }

    pub fn set_wheel_direction(&mut self, reversed: bool) {
        self.engine.reverse_wheel(reversed);
    }

    /// Schedule a scroll; `None` when the request names nothing
    pub fn scroll_to(&mut self, request: &ScrollToRequest) -> Option<ScrollTicket> {
        if self.phase == Phase::Destroyed {
            return None;
        }
        self.navigator
            .scroll_to(request, &self.doc, &self.engine, Instant::now())
    }

    /// Handle a click on an element that may be a scroll-to link
    pub fn click(&mut self, element: ElementId) -> Option<ScrollTicket> {
        if !self
            .doc
            .matches(element, &self.config.scroll.scroll_to_selector)
        {
            debug!(%element, "Click on non scroll-to element ignored");
            return None;
        }
        self.scroll_to(&ScrollToRequest::from_source(element))
    }

    pub fn cancel_scroll(&mut self, ticket: ScrollTicket) -> bool {
        self.navigator.cancel(ticket)
    }

    /// Hand every due scroll to the engine; returns how many fired
    pub fn poll_scrolls(&mut self) -> usize {
        let due = self.navigator.take_due(Instant::now());
        for scroll in &due {
            debug!(ticket = scroll.ticket.0, y = scroll.y, "Scrolling");
            self.engine.scroll_to(0.0, scroll.y, scroll.speed_ms);
        }
        due.len()
    }

    /// Note a window resize; the update runs after the quiet period
    pub fn resize(&mut self) {
        self.resize.poke(Instant::now());
    }

    /// Run the debounced update if its quiet period has passed
    pub fn poll_resize(&mut self) -> Result<bool> {
        if self.resize.fire(Instant::now()) {
            self.update()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Tear down: drop listeners, elements, transforms and pending scrolls
    pub fn destroy(&mut self) {
        if self.phase == Phase::Destroyed {
            return;
        }
        self.doc.set_root_class(&self.config.scroll.root_class, false);
        self.registry.clear();
        self.transforms.clear();
        let cancelled = self.navigator.cancel_all();
        self.resize.cancel();
        self.engine.destroy();
        self.phase = Phase::Destroyed;
        info!(cancelled, "Smooth scroll destroyed");
    }

    /// Dispatch one signal
    pub fn handle(&mut self, signal: ScrollSignal) -> Result<()> {
        if self.phase == Phase::Destroyed {
            debug!(?signal, "Ignoring signal after destroy");
            return Ok(());
        }

        match signal {
            ScrollSignal::Rebuild => self.rebuild()?,
            ScrollSignal::Update { done } => {
                self.update()?;
                if let Some(done) = done {
                    let _ = done.send(());
                }
            }
            ScrollSignal::Render => self.render(false, None),
            ScrollSignal::ScrollTo(request) => {
                self.scroll_to(&request);
            }
            ScrollSignal::Click(element) => {
                self.click(element);
            }
            ScrollSignal::Resize => self.resize(),
            ScrollSignal::Scroll(status) => self.render(false, Some(status)),
            ScrollSignal::Destroy => self.destroy(),
        }
        Ok(())
    }

    /// Handle every queued signal without waiting
    ///
    /// Stops at the first failing signal; later ones stay queued.
    pub fn drain_signals(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Ok(signal) = self.signal_rx.try_recv() {
            self.handle(signal)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Process signals, deferred scrolls and resizes until shutdown or destroy
    ///
    /// Returns the controller so the caller can inspect the final state.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Self {
        info!("Scroll loop started");

        while self.phase != Phase::Destroyed {
            let scroll_deadline = self.navigator.next_deadline();
            let resize_deadline = self.resize.deadline();

            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Scroll loop received shutdown signal");
                        break;
                    }
                }

                signal = self.signal_rx.recv() => {
                    let Some(signal) = signal else { break };
                    if let Err(e) = self.handle(signal) {
                        error!("Signal handling failed: {}", e);
                    }
                }

                _ = sleep_until_deadline(scroll_deadline) => {
                    self.poll_scrolls();
                }

                _ = sleep_until_deadline(resize_deadline) => {
                    if let Err(e) = self.poll_resize() {
                        error!("Resize update failed: {}", e);
                    }
                }
            }
        }

        info!("Scroll loop stopped");
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_alive(&self) -> bool {
        self.phase != Phase::Destroyed
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn transforms(&self) -> &TransformStore {
        &self.transforms
    }

    pub fn snapshot(&self) -> &ScrollSnapshot {
        &self.snapshot
    }

    pub fn last_status(&self) -> Option<ScrollStatus> {
        self.last_status
    }

    pub fn pending_scrolls(&self) -> usize {
        self.navigator.pending()
    }

    pub fn config(&self) -> &ScrollFxConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

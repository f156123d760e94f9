use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use tokio::sync::{mpsc, watch};
use tracing::info;

use scrollfx_core::{Document, ScrollFxConfig, ScrollSignal, ScrollToRequest};

use super::scene::{self, SceneScroll};

/// Time the loop keeps running after the scroll is due
const SETTLE: Duration = Duration::from_millis(50);

/// Where to go, as given on the command line
pub struct Destination {
    pub target: Option<String>,
    pub offset: Option<f64>,
    pub top: bool,
    pub bottom: bool,
}

fn build_request(scroll: &SceneScroll, destination: &Destination) -> Result<ScrollToRequest> {
    if destination.top {
        return Ok(ScrollToRequest::top());
    }
    if destination.bottom {
        return Ok(ScrollToRequest::bottom());
    }

    if let Some(reference) = &destination.target {
        let Some(&element) = scroll.document().resolve(reference).first() else {
            bail!("No element matches {}", reference);
        };
        let request = ScrollToRequest::to_element(element);
        return Ok(match destination.offset {
            Some(extra) => request.with_offset(extra),
            None => request,
        });
    }

    match destination.offset {
        Some(offset) => Ok(ScrollToRequest::to_offset(offset)),
        None => bail!("Nothing to scroll to: pass --target, --offset, --top or --bottom"),
    }
}

pub async fn run(
    config: ScrollFxConfig,
    path: &Path,
    destination: Destination,
    delay: u64,
    speed: Option<u64>,
) -> Result<()> {
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let scroll = scene::open(&config, path)?.with_event_sender(event_tx);

    let mut request = build_request(&scroll, &destination)?.with_delay(delay);
    if let Some(speed) = speed {
        request = request.with_speed(speed);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    scroll
        .signals()
        .send(ScrollSignal::ScrollTo(request))
        .map_err(|_| anyhow!("Scroll loop is not accepting signals"))?;

    info!(delay_ms = delay, "Waiting for scroll");
    let driver = async move {
        tokio::time::sleep(Duration::from_millis(delay) + SETTLE).await;
        let _ = shutdown_tx.send(true);
    };

    let (mut scroll, ()) = tokio::join!(scroll.run(shutdown_rx), driver);
    scroll.drain_signals()?;

    match scroll.engine().calls().last() {
        Some(call) => println!("Scrolled to {:.0} (speed {})", call.y, call.duration_ms),
        None => println!("Nothing to scroll to"),
    }
    scene::print_state(&scroll);

    while let Ok(event) = events.try_recv() {
        println!("{}", serde_json::to_string(&event)?);
    }

    Ok(())
}

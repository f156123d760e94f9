use std::path::Path;

use anyhow::{Context, Result};

use scrollfx_core::memory::{InMemoryDocument, InMemoryEngine, Scene};
use scrollfx_core::{Document, ElementId, ScrollEngine, ScrollFxConfig, SmoothScroll};

pub type SceneScroll = SmoothScroll<InMemoryDocument, InMemoryEngine>;

/// Build the scene and initialize a controller over it
pub fn open(config: &ScrollFxConfig, path: &Path) -> Result<SceneScroll> {
    let scene = Scene::load(path).with_context(|| format!("Failed to load scene {}", path.display()))?;
    let built = scene.build();

    let mut scroll = SmoothScroll::new(built.document, built.engine, config.clone());
    scroll.init().context("Failed to initialize scene")?;
    Ok(scroll)
}

/// `#3 (hero)` for named elements, `#3` otherwise
pub fn label(doc: &InMemoryDocument, element: ElementId) -> String {
    match doc.name(element) {
        Some(name) => format!("{} ({})", element, name),
        None => element.to_string(),
    }
}

/// Print parallax transforms and trigger states at the current position
pub fn print_state(scroll: &SceneScroll) {
    let doc = scroll.document();
    println!("scroll {:.0}", scroll.engine().scroll_top());

    for element in &scroll.registry().parallax {
        let transform = doc
            .transform(element.target)
            .map(|t| t.to_css())
            .unwrap_or_else(|| "none".to_string());
        let visible = if element.in_view { " [in-view]" } else { "" };
        println!("  {:<16} {}{}", label(doc, element.target), transform, visible);
    }

    for element in &scroll.registry().triggers {
        let mut flags = Vec::new();
        if element.in_view {
            flags.push("in-view");
        }
        if element.pinned {
            flags.push("pinned");
        }
        if doc.has_class(element.target, &element.inview_class) {
            flags.push("shown");
        }
        println!("  {:<16} [{}]", label(doc, element.target), flags.join(", "));
    }
}

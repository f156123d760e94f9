use std::path::Path;

use anyhow::Result;

use scrollfx_core::ScrollFxConfig;

use super::scene::{self, label};

pub fn run(config: &ScrollFxConfig, path: &Path) -> Result<()> {
    let scroll = scene::open(config, path)?;
    let doc = scroll.document();
    let registry = scroll.registry();

    if registry.is_empty() {
        println!("No elements match {}", config.scroll.selector);
        return Ok(());
    }

    println!("Trigger elements ({}):\n", registry.triggers.len());
    for element in &registry.triggers {
        let mut extras = Vec::new();
        if element.repeat {
            extras.push("repeat".to_string());
        }
        if element.sticky {
            extras.push("sticky".to_string());
        }
        if let Some(callback) = &element.callback {
            extras.push(format!("callback {}", callback.event));
        }
        println!(
            "  {:<16} {:>8.0} .. {:<8.0} {}{}",
            label(doc, element.target),
            element.offset,
            element.limit,
            element.inview_class,
            if extras.is_empty() {
                String::new()
            } else {
                format!(" [{}]", extras.join(", "))
            }
        );
    }

    println!("\nParallax elements ({}):\n", registry.parallax.len());
    for element in &registry.parallax {
        println!(
            "  {:<16} {:>8.0} .. {:<8.0} speed {} {}{}",
            label(doc, element.target),
            element.offset,
            element.limit,
            element.speed,
            element.position.as_str(),
            if element.horizontal { " horizontal" } else { "" }
        );
    }

    Ok(())
}

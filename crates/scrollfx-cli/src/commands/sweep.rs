use std::path::Path;

use anyhow::{bail, Result};

use scrollfx_core::{ScrollEngine, ScrollFxConfig};

use super::scene;

pub fn run(config: &ScrollFxConfig, path: &Path, from: f64, to: Option<f64>, step: f64) -> Result<()> {
    if !(step.is_finite() && step > 0.0) {
        bail!("--step must be a positive number");
    }

    let mut scroll = scene::open(config, path)?;
    let to = to.unwrap_or_else(|| scroll.engine().limit().y);

    let mut position = from;
    while position <= to {
        scroll.engine_mut().wheel_to(position);
        scroll.drain_signals()?;
        scene::print_state(&scroll);
        position += step;
    }

    Ok(())
}

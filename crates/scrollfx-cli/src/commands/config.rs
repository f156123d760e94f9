use anyhow::Result;

use scrollfx_core::ScrollFxConfig;

pub fn run(config: &ScrollFxConfig) -> Result<()> {
    println!("# {}", ScrollFxConfig::config_path().display());
    print!("{}", config.to_toml()?);
    Ok(())
}

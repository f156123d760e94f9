use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrollfx_core::ScrollFxConfig;

mod commands;

#[derive(Parser)]
#[command(name = "scrollfx")]
#[command(author, version, about = "Run scroll scenes through the parallax and trigger engine")]
struct Cli {
    /// Configuration file (default: ~/.config/scrollfx/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a scene and print the classified elements
    Scan {
        /// Scene description (TOML)
        #[arg(short, long)]
        scene: PathBuf,
    },
    /// Scroll through a scene and print the state at each position
    Sweep {
        #[arg(short, long)]
        scene: PathBuf,
        /// First scroll position
        #[arg(long, default_value_t = 0.0)]
        from: f64,
        /// Last scroll position (default: the scroll limit)
        #[arg(long)]
        to: Option<f64>,
        #[arg(long, default_value_t = 100.0)]
        step: f64,
    },
    /// Scroll to an element or offset through the run loop
    Goto {
        #[arg(short, long)]
        scene: PathBuf,
        /// Element reference such as `#contact` or `.section`
        #[arg(short, long, conflicts_with_all = ["top", "bottom"])]
        target: Option<String>,
        /// Absolute offset, or extra offset with --target
        #[arg(short, long, allow_hyphen_values = true)]
        offset: Option<f64>,
        #[arg(long, conflicts_with = "bottom")]
        top: bool,
        #[arg(long)]
        bottom: bool,
        /// Wait before scrolling, in milliseconds
        #[arg(short, long, default_value_t = 0)]
        delay: u64,
        /// Animation speed passed to the engine
        #[arg(long)]
        speed: Option<u64>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => ScrollFxConfig::load_from(path)?,
        None => ScrollFxConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Scan { scene } => commands::scan::run(&config, &scene),
        Commands::Sweep {
            scene,
            from,
            to,
            step,
        } => commands::sweep::run(&config, &scene, from, to, step),
        Commands::Goto {
            scene,
            target,
            offset,
            top,
            bottom,
            delay,
            speed,
        } => {
            let destination = commands::goto::Destination {
                target,
                offset,
                top,
                bottom,
            };
            commands::goto::run(config, &scene, destination, delay, speed).await
        }
        Commands::Config => commands::config::run(&config),
    }
}

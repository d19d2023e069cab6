use anyhow::Result;
use clap::Parser;
use tracing::info;

mod audio;
mod color;
mod config;
mod engine;
mod metadata;
mod render;
mod session;
mod shell;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "neonamp")]
#[command(author, version, about = "Retro media-player shell with a neon audio visualiser")]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Number of frequency bars (non-mirrored layout)
    #[arg(short, long)]
    bars: Option<usize>,

    /// Mirror the bars around the horizontal centre
    #[arg(long)]
    mirror: bool,

    /// Color scheme: pink, spectrum, fire, ocean, monochrome
    #[arg(long)]
    colors: Option<String>,

    /// Seed for the synthetic bar profile
    #[arg(long)]
    seed: Option<u32>,

    /// Sink to capture (its monitor source is used; default = default sink)
    #[arg(short, long)]
    device: Option<String>,

    /// Start capturing system audio immediately
    #[arg(long)]
    live: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("neonamp=info".parse()?),
        )
        .init();

    let args = Args::parse();

    // Load or create config, CLI flags winning over file values
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_default_path().unwrap_or_default(),
    };
    if let Some(bars) = args.bars {
        config.visualizer.bars = bars;
    }
    if args.mirror {
        config.visualizer.mirror = true;
    }
    if let Some(colors) = &args.colors {
        config.visualizer.color_scheme = colors.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(seed) = args.seed {
        config.visualizer.seed = seed;
    }
    if args.device.is_some() {
        config.audio.device = args.device.clone();
    }
    if args.live {
        config.shell.start_live = true;
    }

    info!(
        "Starting neonamp ({} bars, {})",
        config.visualizer.bar_count(),
        if config.shell.start_live {
            "live capture"
        } else {
            "synthetic signal"
        }
    );

    shell::run(config).await
}

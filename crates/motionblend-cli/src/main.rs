mod commands;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use motionblend_core::config::MotionBlendConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "motionblend", about = "Blend high-rate sub-frames into motion-blurred video frames")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which sub-frame slots a shutter window keeps
    Window(commands::window::WindowArgs),
    /// Show TGA sub-frame header metadata
    Info(commands::info::InfoArgs),
    /// Print or save a default config
    Config(commands::config::ConfigArgs),
    /// Replay a directory of captured sub-frames through the blender
    Blend(commands::blend::BlendArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => MotionBlendConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MotionBlendConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(&config.logging.level)
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Window(args) => commands::window::run(args, &config),
        Commands::Info(args) => commands::info::run(args),
        Commands::Config(args) => commands::config::run(args, &config),
        Commands::Blend(args) => commands::blend::run(args, config),
    }
}

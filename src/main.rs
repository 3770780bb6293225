//! Vidixy - Main Entry Point
//!
//! Loads a directory of node-definition files and prints the resulting
//! registry as JSON, the same view a graph editor consumes.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidixy::{NodeLoader, Registry, VidixyConfig};

#[derive(Debug, Parser)]
#[command(name = "vidixy", version, about = "Load node definitions and print the node registry")]
struct Cli {
    /// Directory containing node-definition files
    #[arg(env = "VIDIXY_NODES_DIR")]
    nodes_dir: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, env = "VIDIXY_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the registry JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => VidixyConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => VidixyConfig::load_or_default(),
    };
    if let Some(dir) = cli.nodes_dir {
        config.nodes_dir = dir;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Loading nodes from {:?}", config.nodes_dir);

    let mut registry = Registry::new();
    let mut loader = NodeLoader::from_config(&config);
    let report = loader
        .load_all(&mut registry, &config.nodes_dir)
        .with_context(|| format!("Failed to load nodes from {:?}", config.nodes_dir))?;

    tracing::info!(
        "Registry ready: {} node(s), {} socket(s), {} private file(s) skipped",
        registry.len(),
        registry.sockets().len(),
        report.skipped.len()
    );

    println!("{}", registry.to_json(cli.pretty)?);

    Ok(())
}

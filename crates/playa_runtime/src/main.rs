//! Playa Geocoder CLI
//!
//! Offline forward and reverse lookups against a bundled asset.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playa_core::Coordinate;
use playa_geocoder::{Geocoder, GeocoderConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "playa-geocode", version, about = "Offline playa address lookups")]
struct Cli {
    /// Lookup asset; overrides the config file and PLAYA_GEOCODER_ASSET
    #[arg(long, global = true)]
    asset: Option<PathBuf>,

    /// JSON geocoder config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Address to coordinate
    Forward { address: String },
    /// Coordinate to address
    Reverse {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Playa Geocoder v{}", playa_core::VERSION);

    let config = load_config(&cli)?;
    let geocoder = Geocoder::from_config(config).context("failed to start geocoder")?;
    if !geocoder.sync_is_available() {
        tracing::warn!("Lookup asset unavailable; every lookup will come back empty");
    }

    match cli.command {
        Command::Forward { address } => {
            let answer = geocoder
                .sync_forward_lookup(&address)
                .valid()
                .map(|coordinate| coordinate.to_string())
                .unwrap_or_else(|| "Location Unknown".to_owned());
            println!("{answer}");
        }
        Command::Reverse {
            latitude,
            longitude,
        } => {
            let answer = geocoder
                .sync_reverse_lookup(Coordinate::new(latitude, longitude))
                .unwrap_or_else(|| "Address Unknown".to_owned());
            println!("{answer}");
        }
    }

    tracing::debug!(stats = ?geocoder.sync_stats(), "Lookup stats");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<GeocoderConfig> {
    let config = match &cli.config {
        Some(path) => GeocoderConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GeocoderConfig::default(),
    };
    let config = config.with_env_overrides();

    Ok(match &cli.asset {
        Some(asset) => config.with_asset_path(asset),
        None => config,
    })
}

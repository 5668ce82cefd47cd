//! # Arcana CLI
//!
//! Headless host for the tarot core: draws the daily card or plays a full
//! three-card reading, against the bundled deck or the REST backend.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tarot-cli -- daily
//! cargo run -p tarot-cli -- --seed 7 reading --pick 2 --pick 0
//! cargo run -p tarot-cli -- --api-url http://localhost:8080/api reading
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved configuration (viewport, backend, storage)
//! - `ApiClient` - REST card pool and best-effort reading upload
//! - `run_reading` - Drives session and card stack frame by frame

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod reading;
pub mod remote;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tarot_core::{TarotConfig, TarotResult, Viewport};

pub use reading::{run_reading, ReadingReport};
pub use remote::{ApiClient, RemoteError};

/// Command-line arguments for arcana.
#[derive(Debug, Clone, Parser)]
#[command(name = "arcana")]
#[command(about = "Tarot readings from the terminal")]
#[command(version)]
pub struct CliArgs {
    /// Backend base URL; the bundled deck is used when absent
    #[arg(long, env = "ARCANA_API_URL")]
    pub api_url: Option<String>,

    /// Directory for saved readings and daily cards
    #[arg(long, env = "ARCANA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON file with animation and layout settings
    #[arg(long, env = "ARCANA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for reproducible draws from the bundled deck
    #[arg(long)]
    pub seed: Option<u64>,

    /// Viewport width in pixels
    #[arg(long, default_value = "400")]
    pub width: f32,

    /// Viewport height in pixels
    #[arg(long, default_value = "800")]
    pub height: f32,

    /// What to draw
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of arcana.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the card of the day
    Daily {
        /// Day to draw for (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Play a three-card reading
    Reading {
        /// Index of the card to tap in each round
        #[arg(long = "pick")]
        picks: Vec<usize>,
    },
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Backend base URL.
    pub api_url: Option<String>,
    /// Storage directory.
    pub data_dir: Option<PathBuf>,
    /// Seed for the bundled deck.
    pub seed: Option<u64>,
    /// Rendering surface.
    pub viewport: Viewport,
    /// Core tunables.
    pub tarot: TarotConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            data_dir: None,
            seed: None,
            viewport: Viewport::default(),
            tarot: TarotConfig::default(),
        }
    }
}

impl CliConfig {
    /// Resolve the configuration from parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn from_args(args: &CliArgs) -> TarotResult<Self> {
        let tarot = match &args.config {
            Some(path) => TarotConfig::load(path)?,
            None => TarotConfig::default(),
        };
        Ok(Self {
            api_url: args.api_url.clone(),
            data_dir: args.data_dir.clone(),
            seed: args.seed,
            viewport: Viewport::new(args.width, args.height),
            tarot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_args() {
        let args = CliArgs::parse_from([
            "arcana", "--seed", "3", "--width", "1024", "reading", "--pick", "2", "--pick", "0",
        ]);
        let config = CliConfig::from_args(&args).expect("config");

        assert_eq!(config.seed, Some(3));
        assert!((config.viewport.width - 1024.0).abs() < f32::EPSILON);
        assert!((config.viewport.height - 800.0).abs() < f32::EPSILON);
        assert!(matches!(args.command, Command::Reading { ref picks } if picks == &[2, 0]));
    }

    #[test]
    fn test_daily_date_parses() {
        let args = CliArgs::parse_from(["arcana", "daily", "--date", "2026-10-16"]);
        assert!(matches!(
            args.command,
            Command::Daily { date: Some(d) } if d == NaiveDate::from_ymd_opt(2026, 10, 16).expect("date")
        ));
    }

    #[test]
    fn test_config_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("arcana.json");
        std::fs::write(&path, r#"{ "animation": { "spread_angle": 40.0 } }"#).expect("write");

        let args = CliArgs::parse_from([
            "arcana".to_string(),
            "--config".to_string(),
            path.display().to_string(),
            "daily".to_string(),
        ]);
        let config = CliConfig::from_args(&args).expect("config");
        assert!((config.tarot.animation.spread_angle - 40.0).abs() < f32::EPSILON);
    }
}

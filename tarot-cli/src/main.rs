//! # Arcana
//!
//! Terminal host for the tarot core.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tarot_cli::{run_reading, ApiClient, CliArgs, CliConfig, Command};
use tarot_core::{CardPool, CardSession, DailyCardService, LocalCardPool, ReadingStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How long a finished reading may take to upload before we give up on it.
const SAVE_GRACE: Duration = Duration::from_secs(2);

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,tarot_core=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tarot_core=debug,tarot_cli=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = CliConfig::from_args(&args)?;

    let api = config.api_url.as_deref().map(ApiClient::new).transpose()?;
    let pool: Arc<dyn CardPool> = match &api {
        Some(client) => {
            tracing::info!("Drawing from backend {}", config.api_url.as_deref().unwrap_or_default());
            Arc::new(client.clone())
        }
        None => Arc::new(LocalCardPool::major_arcana(config.seed)?),
    };
    let store = match &config.data_dir {
        Some(dir) => ReadingStore::with_data_dir(dir)?,
        None => ReadingStore::new(),
    };

    match args.command {
        Command::Daily { date } => {
            let service = DailyCardService::new(pool, store);
            let card = match date {
                Some(date) => service.draw(date).await?,
                None => service.draw_today().await?,
            };
            println!("{}", card.name);
            if let Some(explanation) = &card.explanation {
                println!("  {explanation}");
            }
        }
        Command::Reading { picks } => {
            let session = CardSession::new(pool).with_store(store);
            let report = run_reading(&session, &config.tarot, config.viewport, &picks).await?;

            for (round, card) in report.cards.iter().enumerate() {
                println!("{}. {}", round + 1, card.name);
                if let Some(explanation) = &card.explanation {
                    println!("   {explanation}");
                }
            }

            if let Some(client) = api {
                let cards = report.cards.clone();
                let upload = tokio::spawn(async move { client.save_reading(&cards).await });
                match tokio::time::timeout(SAVE_GRACE, upload).await {
                    Ok(Ok(Ok(()))) => tracing::debug!("Reading saved"),
                    Ok(Ok(Err(e))) => tracing::warn!("Failed to save reading: {e}"),
                    Ok(Err(e)) => tracing::warn!("Reading upload task failed: {e}"),
                    Err(_) => tracing::warn!("Reading upload still pending, not waiting"),
                }
            }
            session.dismiss_summary();
        }
    }

    Ok(())
}

mod config;
mod model;
mod normalizer;
mod notifier;
mod parser;
mod poller;
mod scraper;
mod storage;
mod utils;

#[cfg(test)]
mod testing;

use config::{AppConfig, MakeCatalog, load_config};
use notifier::{Notifier, TelegramNotifier};
use parser::ToriParser;
use poller::Poller;
use scraper::{Fetcher, NettikoneScraper, ReqwestFetcher, Source, StaticTokenProvider, ToriScraper};
use std::sync::Arc;
use std::time::Duration;
use storage::SqliteStorage;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("😱 Panic occurred: {}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            std::process::exit(1);
        }
    };

    let poller = match build_poller(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Watching makes {:?}, polling every {}s",
        config.makes, config.check_interval_seconds
    );
    let interval = Duration::from_secs(config.check_interval_seconds.max(1));
    poller
        .run(interval, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Bye.");
}

/// Wires stores, scrapers and the notifier from the loaded config.
fn build_poller(config: &AppConfig) -> Result<Poller, Box<dyn std::error::Error>> {
    let storage = Arc::new(Mutex::new(SqliteStorage::new(&config.database_path)?));
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new()?);

    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id,
    )?);
    {
        let notifier = notifier.clone();
        tokio::spawn(async move {
            info!("Sending startup message...");
            if let Err(e) = notifier.notify_text("🚀 Listing sniper started!").await {
                warn!("Startup notification failed: {}", e);
            }
        });
    }

    let make_ids = MakeCatalog::load(&config.makes_file).ids_for(&config.makes);
    let nettikone = NettikoneScraper::new(
        fetcher.clone(),
        storage.clone(),
        Arc::new(StaticTokenProvider::new(&config.api_token)),
        make_ids,
    );

    let tori = ToriScraper::new(
        fetcher,
        ToriParser::new()?,
        storage.clone(),
        config.tori_listing_urls(),
        Duration::from_millis(config.request_delay_ms),
    );

    // Nettikone is reported before Tori
    let sources: Vec<Box<dyn Source>> = vec![Box::new(nettikone), Box::new(tori)];
    Ok(Poller::new(sources, notifier, storage))
}

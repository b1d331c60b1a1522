use super::{Fetcher, Source, filter_new};
use crate::model::{FetchRequest, Listing};
use crate::parser::{Parser, ToriParser};
use crate::storage::SqliteStorage;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const TORI_SOURCE: &str = "Tori";

pub struct ToriScraper {
    fetcher: Arc<dyn Fetcher>,
    parser: ToriParser,
    storage: Arc<Mutex<SqliteStorage>>,
    listing_urls: Vec<String>,
    request_delay: Duration,
}

impl ToriScraper {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        parser: ToriParser,
        storage: Arc<Mutex<SqliteStorage>>,
        listing_urls: Vec<String>,
        request_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            parser,
            storage,
            listing_urls,
            request_delay,
        }
    }

    /// Candidates from one results page; failures only cost this page.
    async fn scrape_url(&self, url: &str) -> Vec<Listing> {
        info!("Scraping Tori URL: {}", url);
        let html = match self.fetcher.fetch(&FetchRequest::get(url)).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to fetch Tori URL {}: {}", url, e);
                return Vec::new();
            }
        };

        match self.parser.parse(&html) {
            Ok(listings) => listings,
            Err(e) => {
                warn!("Failed to parse Tori page {}: {}", url, e);
                Vec::new()
            }
        }
    }
}

/// Politeness delay with up to 25% random jitter on top.
fn jittered(delay: Duration) -> Duration {
    let max_extra = delay.as_millis() as u64 / 4;
    let extra = rand::rng().random_range(0..=max_extra);
    delay + Duration::from_millis(extra)
}

#[async_trait::async_trait]
impl Source for ToriScraper {
    fn name(&self) -> &str {
        TORI_SOURCE
    }

    async fn scrape(&self) -> Vec<Listing> {
        if self.listing_urls.is_empty() {
            warn!("No Tori listing URLs configured.");
            return Vec::new();
        }

        let known = match self.storage.lock().await.known_links() {
            Ok(links) => links,
            Err(e) => {
                warn!("Could not read seen listings, skipping Tori this tick: {}", e);
                return Vec::new();
            }
        };

        let mut candidates = Vec::new();
        for (i, url) in self.listing_urls.iter().enumerate() {
            if i > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(jittered(self.request_delay)).await;
            }
            candidates.extend(self.scrape_url(url).await);
        }

        let new_listings = filter_new(candidates, &known);
        info!("New Tori listings found: {}", new_listings.len());
        new_listings
    }
}

use super::{Fetcher, Source, TokenProvider, filter_new};
use crate::model::{FetchRequest, Listing};
use crate::parser::{NettikoneParser, Parser};
use crate::storage::SqliteStorage;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub const NETTIKONE_SOURCE: &str = "Nettikone";
pub const NETTIKONE_SEARCH_URL: &str = "https://api.nettix.fi/rest/machine/search";

pub struct NettikoneScraper {
    fetcher: Arc<dyn Fetcher>,
    parser: NettikoneParser,
    storage: Arc<Mutex<SqliteStorage>>,
    tokens: Arc<dyn TokenProvider>,
    search_url: String,
    make_ids: Vec<u32>,
}

impl NettikoneScraper {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        storage: Arc<Mutex<SqliteStorage>>,
        tokens: Arc<dyn TokenProvider>,
        make_ids: Vec<u32>,
    ) -> Self {
        Self {
            fetcher,
            parser: NettikoneParser::new(),
            storage,
            tokens,
            search_url: NETTIKONE_SEARCH_URL.to_string(),
            make_ids,
        }
    }

    #[cfg(test)]
    pub fn with_search_url(mut self, url: &str) -> Self {
        self.search_url = url.to_string();
        self
    }

    fn build_request(&self, token: &str) -> FetchRequest {
        let mut query: Vec<(String, String)> = [
            ("page", "1"),
            ("rows", "30"),
            ("status", "forsale"),
            ("categories", "1"),
            ("categories", "2"),
            ("sortBy", "dateCreated"),
            ("sortOrder", "asc"),
            ("includeMakeModel", "true"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        query.extend(self.make_ids.iter().map(|id| ("make".to_string(), id.to_string())));

        FetchRequest {
            url: self.search_url.clone(),
            headers: vec![("X-Access-Token".to_string(), token.to_string())],
            query,
        }
    }
}

#[async_trait::async_trait]
impl Source for NettikoneScraper {
    fn name(&self) -> &str {
        NETTIKONE_SOURCE
    }

    async fn scrape(&self) -> Vec<Listing> {
        let Some(token) = self.tokens.token().await else {
            warn!("No Nettikone API token available, skipping this tick.");
            return Vec::new();
        };

        let known = match self.storage.lock().await.known_links() {
            Ok(links) => links,
            Err(e) => {
                warn!("Could not read seen listings, skipping Nettikone this tick: {}", e);
                return Vec::new();
            }
        };

        let body = match self.fetcher.fetch(&self.build_request(&token)).await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to retrieve Nettikone data: {}", e);
                return Vec::new();
            }
        };

        let candidates = match self.parser.parse(&body) {
            Ok(listings) => listings,
            Err(e) => {
                error!("Unexpected Nettikone response: {}", e);
                return Vec::new();
            }
        };

        let new_listings = filter_new(candidates, &known);
        info!("New Nettikone listings found: {}", new_listings.len());
        new_listings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScraperError;
    use crate::scraper::StaticTokenProvider;
    use crate::testing::FakeFetcher;

    const URL: &str = "https://nettix.test/search";

    fn scraper(fetcher: Arc<FakeFetcher>, token: &str, make_ids: Vec<u32>) -> NettikoneScraper {
        NettikoneScraper::new(
            fetcher,
            Arc::new(Mutex::new(SqliteStorage::open_in_memory().unwrap())),
            Arc::new(StaticTokenProvider::new(token)),
            make_ids,
        )
        .with_search_url(URL)
    }

    #[tokio::test]
    async fn item_without_images_maps_model_and_id() {
        let fetcher = Arc::new(FakeFetcher::new().with_page(
            URL,
            200,
            r#"[{"id": 4711, "model": "FH16", "adUrl": "https://www.nettikone.com/4711"}]"#,
        ));

        let listings = scraper(fetcher, "secret", vec![]).scrape().await;

        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.title, "FH16");
        assert_eq!(listing.details, "FH16");
        assert_eq!(listing.price, "4711");
        assert_eq!(listing.image_url, None);
    }

    #[tokio::test]
    async fn every_item_is_checked_not_just_the_last() {
        let body = r#"[
            {"id": 1},
            {"id": 2, "model": "L90", "adUrl": "https://n.fi/2"},
            {"id": 3, "model": "L90", "adUrl": "https://n.fi/2"}
        ]"#;
        let fetcher = Arc::new(FakeFetcher::new().with_page(URL, 200, body));

        let listings = scraper(fetcher, "secret", vec![]).scrape().await;
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, "2");
    }

    #[tokio::test]
    async fn request_carries_token_and_filters() {
        let fetcher = Arc::new(FakeFetcher::new().with_page(URL, 200, "[]"));
        scraper(fetcher.clone(), "secret", vec![12, 40]).scrape().await;

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.headers, vec![("X-Access-Token".to_string(), "secret".to_string())]);

        let values = |key: &str| -> Vec<String> {
            req.query.iter().filter(|(k, _)| k == key).map(|(_, v)| v.clone()).collect()
        };
        assert_eq!(values("make"), ["12", "40"]);
        assert_eq!(values("categories"), ["1", "2"]);
        assert_eq!(values("status"), ["forsale"]);
        assert_eq!(values("sortBy"), ["dateCreated"]);
    }

    #[tokio::test]
    async fn no_make_filter_when_none_configured() {
        let fetcher = Arc::new(FakeFetcher::new().with_page(URL, 200, "[]"));
        scraper(fetcher.clone(), "secret", vec![]).scrape().await;
        assert!(fetcher.requests()[0].query.iter().all(|(k, _)| k != "make"));
    }

    #[tokio::test]
    async fn missing_token_yields_nothing_without_a_request() {
        let fetcher = Arc::new(FakeFetcher::new().with_page(URL, 200, r#"[{"id":1,"model":"A","adUrl":"https://n.fi/1"}]"#));
        let listings = scraper(fetcher.clone(), "", vec![]).scrape().await;

        assert!(listings.is_empty());
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn error_status_and_bad_body_yield_nothing() {
        let failing = Arc::new(FakeFetcher::new().with_page(URL, 401, "denied"));
        assert!(scraper(failing.clone(), "secret", vec![]).scrape().await.is_empty());
        assert!(matches!(
            failing.fetch(&FetchRequest::get(URL)).await,
            Err(ScraperError::InvalidResponse(401))
        ));

        let garbage = Arc::new(FakeFetcher::new().with_page(URL, 200, r#"{"oops": true}"#));
        assert!(scraper(garbage, "secret", vec![]).scrape().await.is_empty());
    }
}

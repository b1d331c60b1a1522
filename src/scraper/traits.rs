use crate::model::{FetchRequest, Listing, ScraperError};

/// Issues one HTTP GET and returns the body of a successful response.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<String, ScraperError>;
}

/// One upstream listing provider.
///
/// `scrape` returns the listings not seen before, in source order. It never
/// writes to the store; committing is the caller's job.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    async fn scrape(&self) -> Vec<Listing>;
}

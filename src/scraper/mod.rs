// Per-source scraping: fetch, extract, drop what was already seen
pub mod fetcher;
pub mod nettikone;
pub mod token;
pub mod tori;
pub mod traits;

pub use fetcher::ReqwestFetcher;
pub use nettikone::NettikoneScraper;
pub use token::{StaticTokenProvider, TokenProvider};
pub use tori::ToriScraper;
pub use traits::{Fetcher, Source};

use crate::model::Listing;
use std::collections::HashSet;

/// Keeps valid candidates whose link is neither known nor already kept
/// earlier in the same batch. Order is preserved.
pub fn filter_new(candidates: Vec<Listing>, known: &HashSet<String>) -> Vec<Listing> {
    let mut kept_links = HashSet::new();
    candidates
        .into_iter()
        .filter(|listing| listing.is_valid())
        .filter(|listing| !known.contains(&listing.link))
        .filter(|listing| kept_links.insert(listing.link.clone()))
        .collect()
}

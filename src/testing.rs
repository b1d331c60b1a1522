// Test doubles for the network-facing seams
use crate::model::{FetchRequest, Listing, NotifyError, ScraperError};
use crate::notifier::Notifier;
use crate::scraper::Fetcher;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Serves canned responses keyed by URL and records every request.
pub struct FakeFetcher {
    pages: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<FetchRequest>>,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(url.to_string(), (status, body.to_string()));
        self
    }

    /// Every fetch signals `started`, then waits for `release`.
    pub fn with_gate(mut self, started: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((started, release));
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<String, ScraperError> {
        self.requests.lock().unwrap().push(req.clone());

        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }

        match self.pages.get(&req.url) {
            Some((200, body)) => Ok(body.clone()),
            Some((status, _)) => Err(ScraperError::InvalidResponse(*status)),
            None => Err(ScraperError::HttpError(format!("connection refused: {}", req.url))),
        }
    }
}

/// Records every delivered listing; links in `failing` are rejected.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, Listing)>>,
    failing: HashSet<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(links: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: links.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<(String, Listing)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_links(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, l)| l.link).collect()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, listing: &Listing, source: &str) -> Result<(), NotifyError> {
        if self.failing.contains(&listing.link) {
            return Err(NotifyError::Unreachable);
        }
        self.sent
            .lock()
            .unwrap()
            .push((source.to_string(), listing.clone()));
        Ok(())
    }

    async fn notify_text(&self, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Markup of one marketplace card with a title and a relative link.
pub fn tori_card(title: &str, href: &str) -> String {
    format!(
        r#"<div class="w-full p-2">
            <a class="adCard_anchor__hJqwV adCardImageCarousel_snapCarousel___axZ8 m:rounded-bl-lg" href="{href}">
              <img class="adCardImageCarousel_image__PzAHL" src="https://img.tori.fi{href}.jpg">
            </a>
            <h2 class="mb-1 truncate typography_shared__SK_V2 typography_m-headingS__ozYY8 typography_subtitle2__nF6ow">{title}</h2>
            <p class="m:mb-4 typography_shared__SK_V2 typography_m-headingS__ozYY8 typography_subtitle2__nF6ow">10 000 €</p>
            <p class="mb-2 m:mb-4 text-gray-dark truncate typography_shared__SK_V2 typography_m-body1__5__iP typography_caption__Cf12X">2018</p>
          </div>"#
    )
}

pub fn tori_page(cards: &[String]) -> String {
    format!("<!DOCTYPE html><html><body><main>{}</main></body></html>", cards.concat())
}

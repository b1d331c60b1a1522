//! Poll loop: scrape every source, notify each new listing, commit the batch.
//!
//! One tick walks `Idle -> Scraping -> Notifying -> Committing -> Idle`.
//! A tick requested while another is in flight is dropped, never queued, so
//! store writes from two ticks can not interleave.

use crate::model::Listing;
use crate::notifier::Notifier;
use crate::scraper::Source;
use crate::storage::SqliteStorage;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scraping,
    Notifying,
    Committing,
}

impl Phase {
    #[cfg(test)]
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Phase::Scraping,
            2 => Phase::Notifying,
            3 => Phase::Committing,
            _ => Phase::Idle,
        }
    }
}

/// New listings found by one source during the current tick.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: String,
    pub listings: Vec<Listing>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub found: usize,
    pub notified: usize,
    pub failed_notifications: usize,
    pub committed: usize,
    pub commit_failures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Completed(TickReport),
    Skipped,
}

pub struct Poller {
    sources: Vec<Box<dyn Source>>,
    notifier: Arc<dyn Notifier>,
    storage: Arc<Mutex<SqliteStorage>>,
    pending: Mutex<Vec<SourceBatch>>,
    phase: AtomicU8,
}

/// Puts the poller back to idle however the tick ends.
struct IdleOnDrop<'a>(&'a AtomicU8);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(Phase::Idle as u8, Ordering::Release);
    }
}

impl Poller {
    /// `sources` are notified in the order given here.
    pub fn new(
        sources: Vec<Box<dyn Source>>,
        notifier: Arc<dyn Notifier>,
        storage: Arc<Mutex<SqliteStorage>>,
    ) -> Self {
        Self {
            sources,
            notifier,
            storage,
            pending: Mutex::new(Vec::new()),
            phase: AtomicU8::new(Phase::Idle as u8),
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Listings held between scraping and commit; empty outside a tick.
    #[cfg(test)]
    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.iter().map(|b| b.listings.len()).sum()
    }

    fn enter(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    /// Runs one full scrape, notify, commit cycle unless one is already running.
    pub async fn tick(&self) -> TickOutcome {
        if self
            .phase
            .compare_exchange(
                Phase::Idle as u8,
                Phase::Scraping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            warn!("Previous tick still in flight, skipping this one.");
            return TickOutcome::Skipped;
        }
        let _idle = IdleOnDrop(&self.phase);

        let mut report = TickReport::default();

        // Scraping
        let results = join_all(self.sources.iter().map(|source| source.scrape())).await;
        {
            let mut pending = self.pending.lock().await;
            for (source, listings) in self.sources.iter().zip(results) {
                report.found += listings.len();
                if !listings.is_empty() {
                    pending.push(SourceBatch {
                        source: source.name().to_string(),
                        listings,
                    });
                }
            }
        }
        info!("🔎 Tick found {} new listings", report.found);

        // Notifying
        self.enter(Phase::Notifying);
        let mut pending = self.pending.lock().await;
        for batch in pending.iter() {
            for listing in &batch.listings {
                match self.notifier.notify(listing, &batch.source).await {
                    Ok(()) => report.notified += 1,
                    Err(e) => {
                        report.failed_notifications += 1;
                        warn!("Notification for {} failed: {}", listing.link, e);
                    }
                }
            }
        }

        // Committing: failed notifications are committed too (at most once)
        self.enter(Phase::Committing);
        for batch in pending.iter() {
            match self
                .storage
                .lock()
                .await
                .record_all(&batch.source, &batch.listings)
            {
                Ok(inserted) => report.committed += inserted,
                Err(e) => {
                    report.commit_failures += 1;
                    error!("Failed to save {} listings from {}: {}", batch.listings.len(), batch.source, e);
                }
            }
        }
        pending.clear();

        info!(
            "Tick done: notified {}, failed {}, committed {}",
            report.notified, report.failed_notifications, report.committed
        );
        TickOutcome::Completed(report)
    }

    /// Ticks every `period` until `shutdown` resolves. Shutdown is only
    /// observed between ticks; a running tick always finishes.
    pub async fn run(&self, period: Duration, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("🛑 Shutdown requested, poller stopped.");
                    break;
                }
                _ = ticker.tick() => {
                    if let TickOutcome::Completed(report) = self.tick().await {
                        if report.commit_failures > 0 {
                            warn!("{} batches were not saved and will be delivered again", report.commit_failures);
                        }
                    }
                }
            }
        }
    }
}

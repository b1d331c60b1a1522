pub mod telegram;

pub use telegram::TelegramNotifier;

use crate::model::{Listing, NotifyError};

/// Delivers one message per new listing, tagged with its source.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, listing: &Listing, source: &str) -> Result<(), NotifyError>;

    /// Free-form status message (startup, shutdown).
    async fn notify_text(&self, text: &str) -> Result<(), NotifyError>;
}

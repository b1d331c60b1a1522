// notifier/telegram/sender.rs

use crate::model::{Listing, NotifyError};
use crate::notifier::telegram::TelegramNotifier;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Sends a simple text message via Telegram.
pub async fn send_text(notifier: &TelegramNotifier, text: &str) -> Result<(), NotifyError> {
    let params = vec![
        ("chat_id", notifier.chat_id.to_string()),
        ("text", text.to_string()),
    ];
    post(notifier, "sendMessage", &params).await
}

/// Sends a notification for a new listing, with its thumbnail when there is one.
pub async fn send_listing(
    notifier: &TelegramNotifier,
    listing: &Listing,
    source: &str,
) -> Result<(), NotifyError> {
    let message = format_listing(listing, source);
    info!("📤 Sending {} listing: {}", source, listing.link);

    let chat_id = notifier.chat_id.to_string();
    if let Some(image) = &listing.image_url {
        let params = vec![
            ("chat_id", chat_id.clone()),
            ("photo", image.clone()),
            ("caption", message.clone()),
        ];
        match post(notifier, "sendPhoto", &params).await {
            Ok(()) => return Ok(()),
            // Telegram rejects photos it cannot fetch; the text still goes out
            Err(e) => warn!("Photo for {} rejected, sending text only: {}", listing.link, e),
        }
    }

    let params = vec![("chat_id", chat_id), ("text", message)];
    post(notifier, "sendMessage", &params).await
}

pub fn format_listing(listing: &Listing, source: &str) -> String {
    format!(
        "New {} listing\n\nTitle: {}\nPrice: {}\nDetails: {}\nLink: {}",
        source, listing.title, listing.price, listing.details, listing.link
    )
}

async fn post(
    notifier: &TelegramNotifier,
    method: &str,
    params: &[(&str, String)],
) -> Result<(), NotifyError> {
    let url = notifier.method_url(method);
    let response = match timeout(
        Duration::from_secs(10),
        notifier.client.post(&url).form(params).send(),
    )
    .await
    {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            warn!("❌ Telegram {} failed: {}", method, e);
            return Err(NotifyError::ApiError(format!("Send failed: {}", e)));
        }
        Err(_) => {
            warn!("⏳ Telegram {} timed out", method);
            return Err(NotifyError::Unreachable);
        }
    };
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    if !status.is_success() {
        warn!("❌ Telegram API responded [{}]: {}", status, body);
        return Err(NotifyError::ApiError(format!("{}: {}", status, body)));
    }
    info!("✅ Telegram response [{}]", status);
    Ok(())
}

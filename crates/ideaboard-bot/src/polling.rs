//! Long-polling update delivery, used when no webhook domain is configured.

use std::time::Duration;

use ideaboard_core::event::Event;
use ideaboard_telegram::{Result, TelegramClient, to_event};

/// Pause after a failed `getUpdates` before trying again.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Remove any webhook, then hand every update to `handle` forever.
///
/// Transport failures are logged and retried; only the initial webhook
/// removal can fail this function.
pub async fn run<F>(client: &TelegramClient, mut handle: F) -> Result<()>
where
  F: FnMut(Event),
{
  client.delete_webhook().await?;
  tracing::info!("polling for updates");

  let mut offset = None;
  loop {
    let batch = match client.get_updates(offset).await {
      Ok(batch) => batch,
      Err(e) => {
        tracing::warn!(error = %e, "getUpdates failed, retrying");
        tokio::time::sleep(RETRY_DELAY).await;
        continue;
      }
    };

    offset = batch.next_offset.or(offset);
    for update in batch.updates {
      match to_event(update) {
        Some(event) => handle(event),
        None => tracing::trace!("ignoring update"),
      }
    }
  }
}

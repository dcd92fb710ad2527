//! Pull delivery of Telegram updates via `getUpdates` long polling.
//!
//! Updates are handled strictly one after another, so at most one event is being
//! decided at any time.

use crate::dispatcher::Dispatcher;
use crate::telegram::client::BotApi;
use crate::telegram::types::Update;
use crate::telegram::BotApiError;
use async_trait::async_trait;
use log::{info, warn};
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_secs(5);

#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Waits for updates with `update_id >= offset`.
    async fn fetch(&self, offset: i64) -> Result<Vec<Update>, BotApiError>;
}

#[async_trait]
impl UpdateSource for BotApi {
    async fn fetch(&self, offset: i64) -> Result<Vec<Update>, BotApiError> {
        self.get_updates(offset).await
    }
}

/// Fetches and dispatches one batch. Returns the offset for the next call.
pub async fn poll_once(source: &dyn UpdateSource, dispatcher: &Dispatcher, offset: i64) -> i64 {
    match source.fetch(offset).await {
        Ok(updates) => {
            let mut next = offset;
            for update in updates {
                next = next.max(update.update_id + 1);
                dispatcher.dispatch(update).await;
            }
            next
        }
        Err(e) => {
            warn!("Fetching updates failed: {}. Retrying in {:?}", e, RETRY_DELAY);
            tokio::time::sleep(RETRY_DELAY).await;
            offset
        }
    }
}

/// Polls forever. Stop it by dropping the future.
pub async fn run(source: &dyn UpdateSource, dispatcher: Dispatcher) {
    info!("Starting bot polling...");
    let mut offset = 0;
    loop {
        offset = poll_once(source, &dispatcher, offset).await;
    }
}

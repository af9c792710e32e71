//! Notification center: feeds channel events into the store
//!
//! Single event loop owning all store mutations triggered by the channel and
//! the periodic purge. The UI reads (and applies user actions) through
//! [`NotificationCenter::store`].

use chrono::Utc;
use parking_lot::Mutex;
use shared::Notification;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::store::NotificationStore;

#[derive(Clone)]
pub struct NotificationCenter {
    store: Arc<Mutex<NotificationStore>>,
    purge_interval: Duration,
}

impl NotificationCenter {
    pub fn new(store: NotificationStore) -> Self {
        let purge_interval = store.config().purge_interval;
        Self {
            store: Arc::new(Mutex::new(store)),
            purge_interval,
        }
    }

    pub fn store(&self) -> Arc<Mutex<NotificationStore>> {
        self.store.clone()
    }

    /// Run until shutdown or until the channel side hangs up
    pub async fn run(&self, mut events: mpsc::Receiver<Notification>, shutdown: CancellationToken) {
        let mut purge = tokio::time::interval(self.purge_interval);
        purge.tick().await; // skip immediate tick (load already purged)

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,

                _ = purge.tick() => {
                    let purged = self.store.lock().purge_expired(Utc::now());
                    match purged {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(purged = n, "Expired notifications removed"),
                        Err(e) => tracing::warn!("Notification purge failed: {e}"),
                    }
                }

                event = events.recv() => {
                    let Some(notification) = event else {
                        tracing::debug!("Notification channel closed, center stopping");
                        break;
                    };
                    let order_id = notification.order_id.clone();
                    let kind = notification.kind.clone();
                    let stored = self.store.lock().ingest(notification);
                    match stored {
                        Ok(true) => tracing::debug!(%order_id, %kind, "Notification stored"),
                        Ok(false) => {}
                        Err(e) => tracing::warn!(%order_id, %kind, "Failed to store notification: {e}"),
                    }
                }
            }
        }
    }
}

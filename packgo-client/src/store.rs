//! Client-side notification store
//!
//! Keeps received notifications with a read flag, deduplicated on
//! (type, orderId, timestamp). Every mutation writes storage first and only
//! then swaps the in-memory list, so a failed write leaves both unchanged.
//!
//! Positions used by [`NotificationStore::remove_at`] and
//! [`NotificationStore::mark_read`] index [`NotificationStore::entries`]
//! (arrival order, oldest first).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Notification, NotificationTarget, NotificationType, Role};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNotification {
    #[serde(flatten)]
    pub notification: Notification,
    #[serde(default)]
    pub read: bool,
}

impl StoredNotification {
    fn unread(notification: Notification) -> Self {
        Self {
            notification,
            read: false,
        }
    }
}

/// Whether a notification belongs in the list shown to `role`
///
/// The explicit target wins; notifications from producers that omit it fall
/// back to the type.
pub fn visible_to(notification: &Notification, role: Role) -> bool {
    match (role, notification.target) {
        (Role::Admin, _) => true,
        (Role::User, Some(target)) => {
            matches!(target, NotificationTarget::User | NotificationTarget::All)
        }
        (Role::Company, Some(target)) => {
            matches!(target, NotificationTarget::Company | NotificationTarget::All)
        }
        (Role::User, None) => matches!(
            notification.kind,
            NotificationType::OrderConfirmed | NotificationType::OrderCancelled
        ),
        (Role::Company, None) => matches!(
            notification.kind,
            NotificationType::OrderCreated | NotificationType::ReviewSubmitted
        ),
    }
}

pub struct NotificationStore {
    storage: Box<dyn KeyValueStore>,
    config: StoreConfig,
    entries: Vec<StoredNotification>,
}

impl NotificationStore {
    /// Load persisted notifications and drop the expired ones
    ///
    /// An unreadable payload is discarded rather than failing startup.
    pub fn load(
        storage: impl KeyValueStore + 'static,
        config: StoreConfig,
        now: DateTime<Utc>,
    ) -> StoreResult<Self> {
        let entries = match storage.get(&config.storage_key)? {
            Some(raw) => match serde_json::from_str::<Vec<StoredNotification>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(key = %config.storage_key, "Discarding unreadable notifications: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut store = Self {
            storage: Box::new(storage),
            config,
            entries,
        };
        let purged = store.purge_expired(now)?;
        tracing::debug!(
            loaded = store.entries.len(),
            purged,
            "Notification store loaded"
        );
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn entries(&self) -> &[StoredNotification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a received notification unless it is a duplicate
    pub fn ingest(&mut self, notification: Notification) -> StoreResult<bool> {
        let key = notification.dedup_key();
        if self
            .entries
            .iter()
            .any(|e| e.notification.dedup_key() == key)
        {
            tracing::debug!(order_id = %notification.order_id, kind = %notification.kind, "Duplicate notification ignored");
            return Ok(false);
        }

        let mut next = self.entries.clone();
        next.push(StoredNotification::unread(notification));
        self.commit(next)?;
        Ok(true)
    }

    /// Drop entries older than the retention window, returns how many went
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> StoreResult<usize> {
        let cutoff = now - self.config.retention;
        let next: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.notification.timestamp >= cutoff)
            .cloned()
            .collect();
        let removed = self.entries.len() - next.len();
        if removed > 0 {
            self.commit(next)?;
        }
        Ok(removed)
    }

    pub fn clear_all(&mut self) -> StoreResult<()> {
        self.commit(Vec::new())
    }

    pub fn remove_at(&mut self, index: usize) -> StoreResult<StoredNotification> {
        self.check_index(index)?;
        let mut next = self.entries.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    /// Remove the first entry for this order and type
    pub fn remove_by(&mut self, order_id: &str, kind: &NotificationType) -> StoreResult<bool> {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| e.notification.order_id == order_id && &e.notification.kind == kind)
        else {
            return Ok(false);
        };
        self.remove_at(index)?;
        Ok(true)
    }

    pub fn mark_read(&mut self, index: usize) -> StoreResult<()> {
        self.check_index(index)?;
        if self.entries[index].read {
            return Ok(());
        }
        let mut next = self.entries.clone();
        next[index].read = true;
        self.commit(next)
    }

    /// Returns how many entries changed
    pub fn mark_all_read(&mut self) -> StoreResult<usize> {
        let unread = self.entries.iter().filter(|e| !e.read).count();
        if unread == 0 {
            return Ok(0);
        }
        let next = self
            .entries
            .iter()
            .cloned()
            .map(|e| StoredNotification { read: true, ..e })
            .collect();
        self.commit(next)?;
        Ok(unread)
    }

    /// Entries shown to `role`, paired with their store position
    pub fn visible_for(&self, role: Role) -> Vec<(usize, &StoredNotification)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| visible_to(&e.notification, role))
            .collect()
    }

    pub fn unread_count(&self, role: Role) -> usize {
        self.visible_for(role)
            .into_iter()
            .filter(|(_, e)| !e.read)
            .count()
    }

    fn check_index(&self, index: usize) -> StoreResult<()> {
        if index >= self.entries.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    fn commit(&mut self, next: Vec<StoredNotification>) -> StoreResult<()> {
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }

    fn persist(&self, entries: &[StoredNotification]) -> StoreResult<()> {
        if entries.is_empty() {
            self.storage.remove(&self.config.storage_key)?;
            return Ok(());
        }
        let start = entries.len().saturating_sub(self.config.max_persisted);
        let json = serde_json::to_string(&entries[start..])?;
        self.storage.set(&self.config.storage_key, &json)?;
        Ok(())
    }
}

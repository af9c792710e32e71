//! NotificationHub: routing of real-time notifications to live connections
//!
//! ```text
//! Dispatcher (Notifier port)
//!       │ notify(identity, n) / notify_admins(n)
//!       ▼
//! NotificationHub
//!   ├── personal: (account_id, role) → broadcast::Sender<Notification>
//!   │     one channel per identity, shared by all of its connections
//!   └── admins: broadcast::Sender<Notification>
//!         every registered admin connection also subscribes here
//!       │
//!       ▼
//! WebSocket sessions (subscribe on register, drop on disconnect)
//! ```
//!
//! Nothing is buffered for offline identities: publishing to an identity with
//! no live subscription reaches zero connections and the event is gone.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use shared::{Identity, Notification, Role};

use crate::orders::Notifier;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Per-channel buffer; slower receivers lag and skip ahead
const CHANNEL_CAPACITY: usize = 64;

/// Receivers handed to one registered connection
pub struct Subscription {
    pub personal: broadcast::Receiver<Notification>,
    /// Present for admin registrations only
    pub admin: Option<broadcast::Receiver<Notification>>,
}

#[derive(Clone)]
pub struct NotificationHub {
    personal: Arc<DashMap<Identity, broadcast::Sender<Notification>>>,
    admins: broadcast::Sender<Notification>,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        let (admins, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            personal: Arc::new(DashMap::new()),
            admins,
        }
    }

    /// Subscribe a connection to its identity channel (and the admin channel for admins)
    pub fn register(&self, identity: &Identity) -> Subscription {
        let personal = self
            .personal
            .entry(identity.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .downgrade()
            .subscribe();
        let admin = (identity.role == Role::Admin).then(|| self.admins.subscribe());
        Subscription { personal, admin }
    }

    /// Drop the identity channel once its last connection is gone
    ///
    /// Call after the connection's [`Subscription`] has been dropped.
    pub fn unregister(&self, identity: &Identity) {
        self.personal
            .remove_if(identity, |_, tx| tx.receiver_count() == 0);
    }

    pub fn is_online(&self, identity: &Identity) -> bool {
        self.personal
            .get(identity)
            .is_some_and(|tx| tx.receiver_count() > 0)
    }

    /// Number of identities with at least one registered connection
    pub fn online_count(&self) -> usize {
        self.personal
            .iter()
            .filter(|e| e.value().receiver_count() > 0)
            .count()
    }

    /// Publish on one identity's channel; returns the connections reached
    pub fn publish_to(&self, identity: &Identity, notification: Notification) -> usize {
        match self.personal.get(identity) {
            // send only fails when there are no receivers
            Some(tx) => tx.send(notification).unwrap_or(0),
            None => 0,
        }
    }

    /// Publish on the admin broadcast channel; returns the connections reached
    pub fn publish_admins(&self, notification: Notification) -> usize {
        self.admins.send(notification).unwrap_or(0)
    }
}

#[async_trait]
impl Notifier for NotificationHub {
    async fn notify(
        &self,
        recipient: &Identity,
        notification: Notification,
    ) -> Result<usize, BoxError> {
        let reached = self.publish_to(recipient, notification);
        if reached == 0 {
            tracing::debug!(recipient = %recipient, "Recipient offline, notification dropped");
        }
        Ok(reached)
    }

    async fn notify_admins(&self, notification: Notification) -> Result<usize, BoxError> {
        Ok(self.publish_admins(notification))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::{NotificationTarget, NotificationType};

    fn note(order_id: &str) -> Notification {
        Notification::new(
            NotificationType::OrderConfirmed,
            NotificationTarget::User,
            order_id,
            "confirmed",
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn delivers_only_to_the_addressed_identity() {
        let hub = NotificationHub::new();
        let anna = Identity::new("cust-1", Role::User);
        let ben = Identity::new("cust-2", Role::User);
        let mut anna_sub = hub.register(&anna);
        let mut ben_sub = hub.register(&ben);

        assert_eq!(hub.publish_to(&anna, note("o-1")), 1);
        assert_eq!(anna_sub.personal.recv().await.unwrap().order_id, "o-1");
        assert!(ben_sub.personal.try_recv().is_err());
        assert!(anna_sub.admin.is_none());
    }

    #[test]
    fn same_account_id_with_other_role_is_a_different_channel() {
        let hub = NotificationHub::new();
        let as_user = Identity::new("acc-1", Role::User);
        let as_company = Identity::new("acc-1", Role::Company);
        let _sub = hub.register(&as_user);
        assert_eq!(hub.publish_to(&as_company, note("o-1")), 0);
    }

    #[tokio::test]
    async fn all_connections_of_an_identity_receive() {
        let hub = NotificationHub::new();
        let anna = Identity::new("cust-1", Role::User);
        let mut tab1 = hub.register(&anna);
        let mut tab2 = hub.register(&anna);

        assert_eq!(hub.publish_to(&anna, note("o-1")), 2);
        assert!(tab1.personal.recv().await.is_ok());
        assert!(tab2.personal.recv().await.is_ok());
    }

    #[tokio::test]
    async fn admins_get_the_broadcast() {
        let hub = NotificationHub::new();
        let mut admin = hub.register(&Identity::new("admin-1", Role::Admin));
        let _user = hub.register(&Identity::new("cust-1", Role::User));

        assert_eq!(hub.publish_admins(note("o-7")), 1);
        let rx = admin.admin.as_mut().unwrap();
        assert_eq!(rx.recv().await.unwrap().order_id, "o-7");
    }

    #[test]
    fn offline_publish_is_lost() {
        let hub = NotificationHub::new();
        let anna = Identity::new("cust-1", Role::User);
        assert_eq!(hub.publish_to(&anna, note("o-1")), 0);
        assert_eq!(hub.publish_admins(note("o-1")), 0);

        // registering later does not replay
        let mut sub = hub.register(&anna);
        assert!(sub.personal.try_recv().is_err());
    }

    #[test]
    fn unregister_keeps_channel_while_other_connections_live() {
        let hub = NotificationHub::new();
        let anna = Identity::new("cust-1", Role::User);
        let first = hub.register(&anna);
        let second = hub.register(&anna);

        drop(first);
        hub.unregister(&anna);
        assert!(hub.is_online(&anna));

        drop(second);
        hub.unregister(&anna);
        assert!(!hub.is_online(&anna));
        assert_eq!(hub.online_count(), 0);
    }

    #[tokio::test]
    async fn notifier_port_reports_reach() {
        let hub = NotificationHub::new();
        let anna = Identity::new("cust-1", Role::User);
        assert_eq!(hub.notify(&anna, note("o-1")).await.unwrap(), 0);
        let _sub = hub.register(&anna);
        assert_eq!(hub.notify(&anna, note("o-1")).await.unwrap(), 1);
    }
}

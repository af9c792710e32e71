//! Notification payload delivered over the real-time channel
//!
//! Wire shape (both directions):
//!
//! ```json
//! { "type": "order-confirmed", "target": "user", "orderId": "…",
//!   "message": "…", "timestamp": "2025-06-01T10:00:00Z" }
//! ```
//!
//! There is no server-assigned id. Receivers deduplicate on
//! [`DedupKey`] = (type, orderId, timestamp).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of lifecycle event a notification describes
///
/// Unknown kinds survive a round trip as [`NotificationType::Other`] so that
/// older clients keep storing events introduced later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    OrderCreated,
    OrderConfirmed,
    OrderCancelled,
    ReviewSubmitted,
    Other(String),
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::OrderCreated => "order-created",
            NotificationType::OrderConfirmed => "order-confirmed",
            NotificationType::OrderCancelled => "order-cancelled",
            NotificationType::ReviewSubmitted => "review-submitted",
            NotificationType::Other(s) => s,
        }
    }
}

impl From<String> for NotificationType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "order-created" => NotificationType::OrderCreated,
            "order-confirmed" => NotificationType::OrderConfirmed,
            "order-cancelled" => NotificationType::OrderCancelled,
            "review-submitted" => NotificationType::ReviewSubmitted,
            _ => NotificationType::Other(s),
        }
    }
}

impl From<NotificationType> for String {
    fn from(t: NotificationType) -> Self {
        match t {
            NotificationType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient class of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationTarget {
    User,
    Company,
    Admin,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Older producers omit the target; receivers then fall back to the type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NotificationTarget>,
    pub order_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Identity of a notification for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub kind: NotificationType,
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationType,
        target: NotificationTarget,
        order_id: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            target: Some(target),
            order_id: order_id.into(),
            message: message.into(),
            timestamp,
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            kind: self.kind.clone(),
            order_id: self.order_id.clone(),
            timestamp: self.timestamp,
        }
    }
}

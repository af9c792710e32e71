//! Shared types for Pack & Go
//!
//! Types used by both the server and the notification client: the unified
//! error system, the order model, notification payloads and the channel
//! protocol.

pub mod account;
pub mod channel;
pub mod error;
pub mod identity;
pub mod notification;
pub mod order;
pub mod util;

// Re-exports
pub use http;
pub use identity::{Identity, Role};
pub use notification::{DedupKey, Notification, NotificationTarget, NotificationType};
pub use order::{Order, OrderStatus};

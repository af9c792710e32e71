//! packgo-client: real-time notification client for Pack & Go
//!
//! - [`NotificationChannel`]: WebSocket connection with registration,
//!   exponential-backoff reconnect and observable [`ConnectionState`]
//! - [`NotificationStore`]: deduplicated, persisted notification list with
//!   read flags, retention purge and role visibility
//! - [`NotificationCenter`]: event loop wiring the two together
//!
//! ```ignore
//! let channel = NotificationChannel::new(ChannelConfig::new(url, token, identity));
//! let store = NotificationStore::load(FileStorage::new(dir)?, StoreConfig::default(), Utc::now())?;
//! let center = NotificationCenter::new(store);
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! tokio::join!(channel.run(tx, shutdown.clone()), center.run(rx, shutdown));
//! ```

pub mod center;
pub mod channel;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;

pub use center::NotificationCenter;
pub use channel::{Backoff, ConnectionState, NotificationChannel};
pub use config::{ChannelConfig, StoreConfig};
pub use error::{ChannelError, ChannelResult, StoreError, StoreResult};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use store::{NotificationStore, StoredNotification, visible_to};

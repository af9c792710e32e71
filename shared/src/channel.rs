//! Notification channel protocol (WebSocket text frames, JSON)
//!
//! Server → Client: [`ServerEvent`]
//! Client → Server: [`ClientEvent`]
//!
//! ```text
//! client                         server
//!   │ ── WS upgrade ───────────────▶ │
//!   │ ◀──────────── connected ────── │
//!   │ ── register {accountId,role} ▶ │
//!   │ ◀─────────── registered ────── │
//!   │ ◀────────── notification ───── │  (repeated)
//! ```
//!
//! Registration is not kept across transport reconnects: the client must
//! wait for `connected` again and re-register.

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, Role};
use crate::notification::Notification;

/// Client → Server registration payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub account_id: String,
    pub role: Role,
}

impl From<Identity> for Registration {
    fn from(identity: Identity) -> Self {
        Self {
            account_id: identity.account_id,
            role: identity.role,
        }
    }
}

impl From<Registration> for Identity {
    fn from(r: Registration) -> Self {
        Identity::new(r.account_id, r.role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFault {
    pub message: String,
}

/// Server → Client frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Transport is up; the client may register now
    Connected(ConnectionInfo),
    /// Registration accepted (sent again on every idempotent re-register)
    Registered(Registration),
    Notification(Notification),
    /// Protocol-level rejection (bad frame, identity mismatch)
    Error(ChannelFault),
}

/// Client → Server frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    Register(Registration),
}

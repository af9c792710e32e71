//! packgo-server: order lifecycle service with real-time notifications
//!
//! - Order API: creation, status transitions, deletion, reviews (JWT authenticated)
//! - Side-effect dispatch: status emails and role-targeted notifications
//! - Notification channel: WebSocket gateway routing notifications to
//!   registered identities and the admin broadcast

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod live;
pub mod orders;
pub mod state;

pub use config::Config;
pub use state::AppState;

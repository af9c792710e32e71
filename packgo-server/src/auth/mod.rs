//! Session authentication for the order API and the notification channel

pub mod session;

pub use session::{SessionClaims, create_token, session_auth_middleware, verify_token};

//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Default transactional email endpoint (Resend-compatible JSON API)
const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";

/// Server configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port (REST API + notification channel)
    pub http_port: u16,
    /// PostgreSQL connection URL. Development falls back to in-memory storage when unset.
    pub database_url: Option<String>,
    /// JSON file with accounts and companies loaded into the in-memory directory
    pub seed_path: Option<String>,
    /// Secret used to sign and verify session tokens
    pub jwt_secret: String,
    /// Transactional email API key. Unset in development → emails are only logged.
    pub email_api_key: Option<String>,
    /// Transactional email endpoint
    pub email_api_url: String,
    /// Sender address for status emails
    pub email_from: String,
    /// WebSocket path of the notification channel
    pub channel_path: String,
    /// Allowed browser origin (CORS). Unset → any origin.
    pub cors_origin: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() && environment != "development" {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }

        let email_api_key = std::env::var("EMAIL_API_KEY").ok().filter(|s| !s.is_empty());
        if email_api_key.is_none() && environment != "development" {
            return Err(format!("EMAIL_API_KEY must be set in {environment} environment").into());
        }

        let mut channel_path = std::env::var("CHANNEL_PATH").unwrap_or_else(|_| "/ws".into());
        if !channel_path.starts_with('/') {
            channel_path.insert(0, '/');
        }

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url,
            seed_path: std::env::var("SEED_PATH").ok().filter(|s| !s.is_empty()),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            email_api_key,
            email_api_url: std::env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| DEFAULT_EMAIL_API_URL.into()),
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Pack & Go <noreply@packandgo.app>".into()),
            channel_path,
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }

    /// Minimal configuration for tests and local tooling
    pub fn development(jwt_secret: impl Into<String>) -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            database_url: None,
            seed_path: None,
            jwt_secret: jwt_secret.into(),
            email_api_key: None,
            email_api_url: DEFAULT_EMAIL_API_URL.into(),
            email_from: "Pack & Go <noreply@packandgo.app>".into(),
            channel_path: "/ws".into(),
            cors_origin: None,
        }
    }
}

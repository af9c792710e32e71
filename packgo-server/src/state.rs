//! Application state for packgo-server

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::db::{
    AccountDirectory, MemoryAccountDirectory, MemoryOrderRepository, OrderRepository,
    PgAccountDirectory, PgOrderRepository,
};
use crate::email::{HttpMailer, LogMailer, Mailer};
use crate::live::NotificationHub;
use crate::orders::{Dispatcher, OrderService};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Order use cases (transition rules + side-effect dispatch)
    pub orders: OrderService,
    /// Live notification routing, also the dispatcher's notifier
    pub hub: NotificationHub,
    /// JWT secret for session verification
    pub jwt_secret: Arc<str>,
}

impl AppState {
    /// Create a new AppState from configuration
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let (orders, directory): (Arc<dyn OrderRepository>, Arc<dyn AccountDirectory>) =
            match &config.database_url {
                Some(url) => {
                    let pool = PgPool::connect(url).await?;
                    sqlx::migrate!("./migrations").run(&pool).await?;
                    tracing::info!("Connected to PostgreSQL, migrations applied");
                    (
                        Arc::new(PgOrderRepository::new(pool.clone())),
                        Arc::new(PgAccountDirectory::new(pool)),
                    )
                }
                None => {
                    let directory = match &config.seed_path {
                        Some(path) => MemoryAccountDirectory::from_seed_file(path)?,
                        None => MemoryAccountDirectory::new(),
                    };
                    tracing::warn!("DATABASE_URL not set, using in-memory storage");
                    (Arc::new(MemoryOrderRepository::new()), Arc::new(directory))
                }
            };

        let mailer: Arc<dyn Mailer> = match &config.email_api_key {
            Some(key) => Arc::new(HttpMailer::new(
                &config.email_api_url,
                key,
                &config.email_from,
            )),
            None => {
                tracing::warn!("EMAIL_API_KEY not set, status emails will only be logged");
                Arc::new(LogMailer)
            }
        };

        Ok(Self::from_parts(orders, directory, mailer, &config.jwt_secret))
    }

    /// Wire the state from explicit collaborators
    pub fn from_parts(
        orders: Arc<dyn OrderRepository>,
        directory: Arc<dyn AccountDirectory>,
        mailer: Arc<dyn Mailer>,
        jwt_secret: &str,
    ) -> Self {
        let hub = NotificationHub::new();
        let dispatcher = Arc::new(Dispatcher::new(
            directory.clone(),
            mailer,
            Arc::new(hub.clone()),
        ));
        Self {
            orders: OrderService::new(orders, directory, dispatcher),
            hub,
            jwt_secret: jwt_secret.into(),
        }
    }
}

//! Shared helpers for router-level tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use chrono::Utc;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;

use packgo_server::db::{MemoryAccountDirectory, MemoryOrderRepository, OrderRepository};
use packgo_server::email::{Mailer, OutboundEmail};
use packgo_server::{AppState, Config, api};
use shared::account::{Account, Company, Locale};
use shared::order::{Address, Order, OrderStatus};
use shared::{Identity, Role};

pub const SECRET: &str = "test-secret";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Mailer that forwards every email to the test
pub struct ChannelMailer(mpsc::UnboundedSender<OutboundEmail>);

#[async_trait]
impl Mailer for ChannelMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), BoxError> {
        self.0.send(email.clone())?;
        Ok(())
    }
}

/// Mailer whose sends never complete
pub struct StalledMailer;

#[async_trait]
impl Mailer for StalledMailer {
    async fn send(&self, _email: &OutboundEmail) -> Result<(), BoxError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub repo: MemoryOrderRepository,
    pub emails: mpsc::UnboundedReceiver<OutboundEmail>,
}

pub fn customer() -> Identity {
    Identity::new("cust-1", Role::User)
}

pub fn company() -> Identity {
    Identity::new("acc-comp-1", Role::Company)
}

pub fn admin() -> Identity {
    Identity::new("admin-1", Role::Admin)
}

pub fn token(identity: &Identity) -> String {
    packgo_server::auth::create_token(&identity.account_id, identity.role, SECRET).unwrap()
}

fn directory() -> MemoryAccountDirectory {
    let dir = MemoryAccountDirectory::new();
    dir.insert_account(Account {
        id: "cust-1".into(),
        name: "Anna Becker".into(),
        email: "anna@example.com".into(),
        phone: None,
        role: Role::User,
        locale: Locale::En,
    });
    dir.insert_account(Account {
        id: "acc-comp-1".into(),
        name: "Jonas Schmidt".into(),
        email: "jonas@schmidt.de".into(),
        phone: None,
        role: Role::Company,
        locale: Locale::De,
    });
    dir.insert_company(Company {
        id: "comp-1".into(),
        account_id: "acc-comp-1".into(),
        company_name: "Umzüge Schmidt".into(),
        email: "info@schmidt.de".into(),
        phone: None,
        rating: None,
    });
    dir
}

pub fn test_app() -> TestApp {
    let (tx, emails) = mpsc::unbounded_channel();
    build(Arc::new(ChannelMailer(tx)), emails)
}

/// App whose status emails go to `mailer` instead of the test channel
pub fn test_app_with_mailer(mailer: Arc<dyn Mailer>) -> TestApp {
    let (_tx, emails) = mpsc::unbounded_channel();
    build(mailer, emails)
}

fn build(mailer: Arc<dyn Mailer>, emails: mpsc::UnboundedReceiver<OutboundEmail>) -> TestApp {
    let repo = MemoryOrderRepository::new();
    let state = AppState::from_parts(
        Arc::new(repo.clone()),
        Arc::new(directory()),
        mailer,
        SECRET,
    );
    let router = api::create_router(state.clone(), &Config::development(SECRET));
    TestApp {
        router,
        state,
        repo,
        emails,
    }
}

fn address(city: &str) -> Address {
    Address {
        street: "Hauptstr. 1".into(),
        postal_code: "10115".into(),
        city: city.into(),
        country: "DE".into(),
    }
}

pub fn order(id: &str, status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id: id.into(),
        customer_id: "cust-1".into(),
        company_id: "comp-1".into(),
        company_account_id: "acc-comp-1".into(),
        origin: address("Berlin"),
        destination: address("Hamburg"),
        preferred_dates: vec![
            "2025-06-01".parse().unwrap(),
            "2025-06-02".parse().unwrap(),
        ],
        confirmed_date: None,
        helpers: 2,
        estimated_hours: 5,
        total_price: Decimal::new(45000, 2),
        status,
        notes: None,
        review: None,
        created_at: now,
        updated_at: now,
        confirmed_at: None,
    }
}

impl TestApp {
    pub async fn seed(&self, id: &str, status: OrderStatus) {
        self.repo.insert(&order(id, status)).await.unwrap();
    }

    pub async fn stored(&self, id: &str) -> Option<Order> {
        self.repo.find(id).await.unwrap()
    }

    /// Send a request through the router and decode the JSON body
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        as_identity: Option<&Identity>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(identity) = as_identity {
            builder = builder.header("Authorization", format!("Bearer {}", token(identity)));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

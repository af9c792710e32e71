//! Fixtures and recording doubles for unit tests

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

use shared::account::{Account, Company, Locale};
use shared::order::{Address, Order, OrderStatus};
use shared::{Identity, Notification, Role};

use super::Notifier;
use crate::db::{AccountDirectory, MemoryAccountDirectory};
use crate::email::{Mailer, OutboundEmail};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn address(street: &str, postal_code: &str, city: &str) -> Address {
    Address {
        street: street.into(),
        postal_code: postal_code.into(),
        city: city.into(),
        country: "DE".into(),
    }
}

/// Order `o-1` of customer `cust-1` with company `comp-1` (account `acc-comp-1`)
pub fn order_fixture(status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id: "o-1".into(),
        customer_id: "cust-1".into(),
        company_id: "comp-1".into(),
        company_account_id: "acc-comp-1".into(),
        origin: address("Hauptstr. 1", "10115", "Berlin"),
        destination: address("Marienplatz 2", "80331", "München"),
        preferred_dates: vec![date("2025-06-01"), date("2025-06-02")],
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

/// Directory holding `cust-1` (Anna) and `comp-1` operated by `acc-comp-1`
pub fn directory() -> Arc<dyn AccountDirectory> {
    let dir = MemoryAccountDirectory::new();
    dir.insert_account(Account {
        id: "cust-1".into(),
        name: "Anna Becker".into(),
        email: "anna@example.com".into(),
        phone: None,
        role: Role::User,
        locale: Locale::De,
    });
    dir.insert_account(Account {
        id: "acc-comp-1".into(),
        name: "Jonas Schmidt".into(),
        email: "jonas@schmidt.de".into(),
        phone: Some("+49 30 1234567".into()),
        role: Role::Company,
        locale: Locale::De,
    });
    dir.insert_company(Company {
        id: "comp-1".into(),
        account_id: "acc-comp-1".into(),
        company_name: "Umzüge Schmidt".into(),
        email: "info@schmidt.de".into(),
        phone: None,
        rating: Some(4.6),
    });
    Arc::new(dir)
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), BoxError> {
        if self.fail {
            return Err("provider unavailable".into());
        }
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

/// Records every emit; `None` recipient means the admin broadcast
#[derive(Default)]
pub struct RecordingNotifier {
    emitted: Mutex<Vec<(Option<Identity>, Notification)>>,
}

impl RecordingNotifier {
    pub fn emitted(&self) -> Vec<(Option<Identity>, Notification)> {
        self.emitted.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        recipient: &Identity,
        notification: Notification,
    ) -> Result<usize, BoxError> {
        self.emitted
            .lock()
            .push((Some(recipient.clone()), notification));
        Ok(1)
    }

    async fn notify_admins(&self, notification: Notification) -> Result<usize, BoxError> {
        self.emitted.lock().push((None, notification));
        Ok(1)
    }
}

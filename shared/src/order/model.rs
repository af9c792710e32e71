use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderStatus;

/// Maximum number of preferred move dates a customer may submit
pub const MAX_PREFERRED_DATES: usize = 3;

/// Postal address of a move origin or destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// Customer review attached to a completed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A customer's move request and its negotiated fulfillment state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Customer account that submitted the order
    pub customer_id: String,
    pub company_id: String,
    /// Account that operates `company_id`, used for access checks
    pub company_account_id: String,
    pub origin: Address,
    pub destination: Address,
    /// 1 to 3 dates, most preferred first
    pub preferred_dates: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_date: Option<NaiveDate>,
    pub helpers: u32,
    pub estimated_hours: u32,
    /// Price snapshot taken at submission
    pub total_price: Decimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_customer(&self, account_id: &str) -> bool {
        self.customer_id == account_id
    }

    pub fn is_company_account(&self, account_id: &str) -> bool {
        self.company_account_id == account_id
    }

    pub fn prefers(&self, date: NaiveDate) -> bool {
        self.preferred_dates.contains(&date)
    }
}

/// Validate a customer's list of preferred dates (1..=3, no duplicates)
pub fn preferred_dates_valid(dates: &[NaiveDate]) -> bool {
    if dates.is_empty() || dates.len() > MAX_PREFERRED_DATES {
        return false;
    }
    dates
        .iter()
        .enumerate()
        .all(|(i, d)| !dates[..i].contains(d))
}

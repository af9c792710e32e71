//! Request / response bodies of the order API

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Address, Order, OrderStatus};
use crate::account::{AccountSummary, CompanySummary};

/// POST /orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub company_id: String,
    pub origin: Address,
    pub destination: Address,
    pub preferred_dates: Vec<NaiveDate>,
    pub helpers: u32,
    pub estimated_hours: u32,
    /// Quote shown to the customer at submission, stored as-is
    pub total_price: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

/// PUT /orders/{id}
///
/// Customers and companies may only send `status`, `confirmedDate` and
/// `notes`. The remaining fields are admin edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub confirmed_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub helpers: Option<u32>,
    #[serde(default)]
    pub estimated_hours: Option<u32>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub preferred_dates: Option<Vec<NaiveDate>>,
}

impl UpdateOrderRequest {
    pub fn has_admin_fields(&self) -> bool {
        self.helpers.is_some()
            || self.estimated_hours.is_some()
            || self.total_price.is_some()
            || self.preferred_dates.is_some()
    }
}

/// POST /orders/{id}/review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

/// What DELETE /orders/{id} did to the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteAction {
    /// Soft delete: the order now has status `cancelled`
    Cancelled,
    /// The record was removed permanently
    Deleted,
}

/// DELETE /orders/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOrderResponse {
    pub action: DeleteAction,
    pub order_id: String,
    /// The cancelled order (absent after a hard delete)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

/// GET /orders/{id}: the order joined with display fields of both parties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<AccountSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanySummary>,
}

//! Human-readable notification texts

use shared::account::{Account, Company};
use shared::order::Order;
use shared::NotificationType;

/// Display data of both parties, looked up once per dispatch
///
/// Missing lookups fall back to the raw ids so a message can always be built.
#[derive(Debug, Clone, Default)]
pub struct Parties {
    pub customer: Option<Account>,
    pub company: Option<Company>,
}

impl Parties {
    pub fn customer_name<'a>(&'a self, order: &'a Order) -> &'a str {
        self.customer
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or(&order.customer_id)
    }

    pub fn company_name<'a>(&'a self, order: &'a Order) -> &'a str {
        self.company
            .as_ref()
            .map(|c| c.company_name.as_str())
            .unwrap_or(&order.company_id)
    }
}

pub fn notification_message(kind: &NotificationType, order: &Order, parties: &Parties) -> String {
    let route = format!("{} → {}", order.origin.city, order.destination.city);
    match kind {
        NotificationType::OrderCreated => format!(
            "New move request from {}: {route}",
            parties.customer_name(order)
        ),
        NotificationType::OrderConfirmed => match order.confirmed_date {
            Some(date) => format!(
                "{} confirmed your move {route} for {date}",
                parties.company_name(order)
            ),
            None => format!("{} confirmed your move {route}", parties.company_name(order)),
        },
        NotificationType::OrderCancelled => format!("Move {route} was cancelled"),
        NotificationType::ReviewSubmitted => match &order.review {
            Some(review) => format!(
                "{} rated the move {route} with {}/5",
                parties.customer_name(order),
                review.rating
            ),
            None => format!("{} reviewed the move {route}", parties.customer_name(order)),
        },
        NotificationType::Other(kind) => format!("Order {}: {kind}", order.id),
    }
}

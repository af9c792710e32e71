//! Status update email texts (German / English)

use shared::account::Locale;
use shared::order::{Order, OrderStatus};

fn status_label(locale: Locale, status: OrderStatus) -> &'static str {
    match (locale, status) {
        (Locale::De, OrderStatus::Pending) => "ausstehend",
        (Locale::De, OrderStatus::Confirmed) => "bestätigt",
        (Locale::De, OrderStatus::Declined) => "abgelehnt",
        (Locale::De, OrderStatus::Completed) => "abgeschlossen",
        (Locale::De, OrderStatus::Cancelled) => "storniert",
        (Locale::En, OrderStatus::Pending) => "pending",
        (Locale::En, OrderStatus::Confirmed) => "confirmed",
        (Locale::En, OrderStatus::Declined) => "declined",
        (Locale::En, OrderStatus::Completed) => "completed",
        (Locale::En, OrderStatus::Cancelled) => "cancelled",
    }
}

/// Subject and body of the email sent to the customer after a status change
pub fn status_update(
    locale: Locale,
    customer_name: &str,
    company_name: &str,
    order: &Order,
) -> (String, String) {
    let label = status_label(locale, order.status);
    let route = format!("{} → {}", order.origin.city, order.destination.city);

    match locale {
        Locale::De => {
            let subject = format!("Ihr Umzug {route}: {label}");
            let mut text = format!(
                "Hallo {customer_name},\n\n\
                 der Status Ihres Umzugs {route} mit {company_name} ist jetzt: {label}.\n"
            );
            if order.status == OrderStatus::Confirmed
                && let Some(date) = order.confirmed_date
            {
                text.push_str(&format!("Umzugstermin: {}\n", date.format("%d.%m.%Y")));
            }
            text.push_str(&format!(
                "\nAuftragsnummer: {}\n\nIhr Pack & Go Team",
                order.id
            ));
            (subject, text)
        }
        Locale::En => {
            let subject = format!("Your move {route}: {label}");
            let mut text = format!(
                "Hello {customer_name},\n\n\
                 the status of your move {route} with {company_name} is now: {label}.\n"
            );
            if order.status == OrderStatus::Confirmed
                && let Some(date) = order.confirmed_date
            {
                text.push_str(&format!("Moving date: {}\n", date.format("%Y-%m-%d")));
            }
            text.push_str(&format!("\nOrder number: {}\n\nYour Pack & Go team", order.id));
            (subject, text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::testing::{date, order_fixture};

    #[test]
    fn german_confirmation_mentions_date() {
        let mut order = order_fixture(OrderStatus::Confirmed);
        order.confirmed_date = Some(date("2025-06-01"));
        let (subject, text) = status_update(Locale::De, "Anna", "Umzüge Schmidt", &order);
        assert!(subject.contains("bestätigt"));
        assert!(text.contains("Hallo Anna"));
        assert!(text.contains("01.06.2025"));
        assert!(text.contains(&order.id));
    }

    #[test]
    fn english_cancellation_has_no_date_line() {
        let order = order_fixture(OrderStatus::Cancelled);
        let (subject, text) = status_update(Locale::En, "Anna", "Schmidt Moving", &order);
        assert!(subject.ends_with("cancelled"));
        assert!(!text.contains("Moving date"));
    }
}

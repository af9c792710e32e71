//! Side effects of order mutations
//!
//! Planning is pure: [`plan_status_effects`] and friends compare snapshots and
//! return the effects to fire. [`Dispatcher::run`] executes them concurrently.
//! Every effect is attempted once; a failing effect is logged and does not
//! stop the others.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;

use shared::order::{Order, OrderStatus};
use shared::{Identity, Notification, NotificationTarget, NotificationType, Role};

use super::messages::{Parties, notification_message};
use crate::db::AccountDirectory;
use crate::email::{Mailer, OutboundEmail, templates};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Real-time delivery port
///
/// Returns how many live connections the notification reached. Zero is not an
/// error: offline recipients simply miss the event.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &Identity, notification: Notification)
    -> Result<usize, BoxError>;

    async fn notify_admins(&self, notification: Notification) -> Result<usize, BoxError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Email the customer about the order's new status
    StatusEmail,
    /// Notification on one identity's channel
    Notify {
        recipient: Identity,
        kind: NotificationType,
        target: NotificationTarget,
    },
    /// Mirror on the admin broadcast channel
    NotifyAdmins { kind: NotificationType },
}

impl Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::StatusEmail => "status_email",
            Effect::Notify { .. } => "notify",
            Effect::NotifyAdmins { .. } => "notify_admins",
        }
    }
}

fn customer_of(order: &Order) -> Identity {
    Identity::new(order.customer_id.clone(), Role::User)
}

fn company_of(order: &Order) -> Identity {
    Identity::new(order.company_account_id.clone(), Role::Company)
}

/// Effects of a PUT/DELETE that moved `before` to `after`
pub fn plan_status_effects(before: &Order, after: &Order) -> Vec<Effect> {
    if before.status == after.status {
        return Vec::new();
    }

    let mut effects = vec![Effect::StatusEmail];
    let kind = match after.status {
        OrderStatus::Confirmed => NotificationType::OrderConfirmed,
        OrderStatus::Cancelled => NotificationType::OrderCancelled,
        _ => return effects,
    };
    effects.push(Effect::Notify {
        recipient: customer_of(after),
        kind: kind.clone(),
        target: NotificationTarget::User,
    });
    effects.push(Effect::NotifyAdmins { kind });
    effects
}

/// Effects of a new customer submission
pub fn plan_created_effects(order: &Order) -> Vec<Effect> {
    vec![
        Effect::Notify {
            recipient: company_of(order),
            kind: NotificationType::OrderCreated,
            target: NotificationTarget::Company,
        },
        Effect::NotifyAdmins {
            kind: NotificationType::OrderCreated,
        },
    ]
}

/// Effects of a customer review
pub fn plan_review_effects(order: &Order) -> Vec<Effect> {
    vec![
        Effect::Notify {
            recipient: company_of(order),
            kind: NotificationType::ReviewSubmitted,
            target: NotificationTarget::Company,
        },
        Effect::NotifyAdmins {
            kind: NotificationType::ReviewSubmitted,
        },
    ]
}

/// Outcome of one dispatch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub failed: usize,
}

pub struct Dispatcher {
    directory: Arc<dyn AccountDirectory>,
    mailer: Arc<dyn Mailer>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        mailer: Arc<dyn Mailer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            mailer,
            notifier,
        }
    }

    /// Execute `effects` for `order`
    ///
    /// All notifications of one run share a timestamp, so the customer copy
    /// and the admin mirror carry the same dedup key.
    pub async fn run(&self, order: &Order, effects: &[Effect]) -> DispatchReport {
        if effects.is_empty() {
            return DispatchReport::default();
        }

        let parties = self.lookup_parties(order).await;
        let timestamp = Utc::now();

        let results = join_all(
            effects
                .iter()
                .map(|effect| self.execute(effect, order, &parties, timestamp)),
        )
        .await;

        let mut report = DispatchReport {
            attempted: effects.len(),
            failed: 0,
        };
        for (effect, result) in effects.iter().zip(results) {
            if let Err(e) = result {
                report.failed += 1;
                tracing::warn!(
                    order_id = %order.id,
                    status = %order.status,
                    effect = effect.name(),
                    error = %e,
                    "Order side effect failed"
                );
            }
        }
        report
    }

    async fn lookup_parties(&self, order: &Order) -> Parties {
        let (customer, company) = futures::join!(
            self.directory.account(&order.customer_id),
            self.directory.company(&order.company_id),
        );
        Parties {
            customer: customer.unwrap_or_else(|e| {
                tracing::warn!(order_id = %order.id, account_id = %order.customer_id, error = %e, "Customer lookup failed");
                None
            }),
            company: company.unwrap_or_else(|e| {
                tracing::warn!(order_id = %order.id, company_id = %order.company_id, error = %e, "Company lookup failed");
                None
            }),
        }
    }

    async fn execute(
        &self,
        effect: &Effect,
        order: &Order,
        parties: &Parties,
        timestamp: DateTime<Utc>,
    ) -> Result<(), BoxError> {
        match effect {
            Effect::StatusEmail => {
                let customer = parties
                    .customer
                    .as_ref()
                    .ok_or("customer account not found")?;
                let (subject, text) = templates::status_update(
                    customer.locale,
                    &customer.name,
                    parties.company_name(order),
                    order,
                );
                self.mailer
                    .send(&OutboundEmail {
                        to: customer.email.clone(),
                        subject,
                        text,
                    })
                    .await
            }
            Effect::Notify {
                recipient,
                kind,
                target,
            } => {
                let notification = Notification::new(
                    kind.clone(),
                    *target,
                    order.id.clone(),
                    notification_message(kind, order, parties),
                    timestamp,
                );
                let reached = self.notifier.notify(recipient, notification).await?;
                tracing::debug!(order_id = %order.id, recipient = %recipient, kind = %kind, reached, "Notification published");
                Ok(())
            }
            Effect::NotifyAdmins { kind } => {
                let notification = Notification::new(
                    kind.clone(),
                    NotificationTarget::Admin,
                    order.id.clone(),
                    notification_message(kind, order, parties),
                    timestamp,
                );
                let reached = self.notifier.notify_admins(notification).await?;
                tracing::debug!(order_id = %order.id, kind = %kind, reached, "Admin notification published");
                Ok(())
            }
        }
    }
}

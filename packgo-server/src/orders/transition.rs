//! Order lifecycle rules
//!
//! Pure functions: given the acting identity, the stored order and the
//! requested change, decide whether the change is legal and compute the next
//! order snapshot. Nothing here touches storage or emits side effects.
//!
//! ```text
//!            company confirm            company complete
//! pending ─────────────────▶ confirmed ─────────────────▶ completed
//!    │                          │
//!    │ company decline          │ customer cancel
//!    │ customer cancel          │
//!    ▼                          ▼
//! cancelled ◀───────────────────┘
//!
//! declined: reachable only through an admin edit
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use shared::error::{AppError, ErrorCode};
use shared::order::{Order, OrderStatus, UpdateOrderRequest, preferred_dates_valid};
use shared::{Identity, Role};

/// Lowest and highest accepted review rating
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("caller is neither the customer, the company nor an admin")]
    NotParticipant,
    #[error("{role} may not move an order from {from} to {to}")]
    NotAllowed {
        role: Role,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("a confirmed date from the preferred dates is required")]
    ConfirmedDateRequired,
    #[error("{0} is not one of the preferred dates")]
    ConfirmedDateNotPreferred(NaiveDate),
    #[error("only admins may edit helpers, hours, price or preferred dates")]
    AdminFieldsForbidden,
    #[error("preferred dates must be 1 to 3 distinct dates")]
    InvalidPreferredDates,
    #[error("{role} may not delete an order in status {status}")]
    NotDeletable { role: Role, status: OrderStatus },
    #[error("only the customer of this order may review it")]
    NotReviewer,
    #[error("only completed orders can be reviewed (status is {0})")]
    ReviewNotAllowed(OrderStatus),
    #[error("this order has already been reviewed")]
    AlreadyReviewed,
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        let message = e.to_string();
        match e {
            TransitionError::NotParticipant
            | TransitionError::AdminFieldsForbidden
            | TransitionError::NotReviewer => {
                AppError::with_message(ErrorCode::PermissionDenied, message)
            }
            TransitionError::NotAllowed { role, from, to } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
                    .with_detail("role", role.as_str())
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            TransitionError::ConfirmedDateRequired => {
                AppError::with_message(ErrorCode::ConfirmedDateRequired, message)
            }
            TransitionError::ConfirmedDateNotPreferred(date) => {
                AppError::with_message(ErrorCode::ConfirmedDateNotPreferred, message)
                    .with_detail("confirmedDate", date.to_string())
            }
            TransitionError::InvalidPreferredDates => {
                AppError::with_message(ErrorCode::InvalidPreferredDates, message)
            }
            TransitionError::NotDeletable { status, .. } => {
                AppError::with_message(ErrorCode::OrderNotDeletable, message)
                    .with_detail("status", status.as_str())
            }
            TransitionError::ReviewNotAllowed(status) => {
                AppError::with_message(ErrorCode::ReviewNotAllowed, message)
                    .with_detail("status", status.as_str())
            }
            TransitionError::AlreadyReviewed => {
                AppError::with_message(ErrorCode::ReviewAlreadySubmitted, message)
            }
            TransitionError::InvalidRating(_) => {
                AppError::with_message(ErrorCode::ValueOutOfRange, message)
                    .with_detail("field", "rating")
            }
        }
    }
}

/// Check that `identity` takes part in `order` and return the role it acts in
pub fn authorize(identity: &Identity, order: &Order) -> Result<Role, TransitionError> {
    match identity.role {
        Role::Admin => Ok(Role::Admin),
        Role::User if order.is_customer(&identity.account_id) => Ok(Role::User),
        Role::Company if order.is_company_account(&identity.account_id) => Ok(Role::Company),
        _ => Err(TransitionError::NotParticipant),
    }
}

/// Whether `role` may move an order from `from` to `to`
///
/// Requesting the current status is always accepted and changes nothing.
pub fn check_transition(
    role: Role,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<(), TransitionError> {
    use OrderStatus::*;

    if from == to {
        return Ok(());
    }
    let allowed = match role {
        Role::Admin => true,
        Role::Company => matches!(
            (from, to),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed)
        ),
        Role::User => matches!((from, to), (Pending | Confirmed, Cancelled)),
    };
    if allowed {
        Ok(())
    } else {
        Err(TransitionError::NotAllowed { role, from, to })
    }
}

/// Pick the confirmed date for a non-admin confirmation
fn resolve_confirmed_date(
    order: &Order,
    requested: Option<NaiveDate>,
) -> Result<Option<NaiveDate>, TransitionError> {
    if order.preferred_dates.is_empty() {
        return Ok(requested);
    }
    match requested {
        None => Err(TransitionError::ConfirmedDateRequired),
        Some(date) if order.prefers(date) => Ok(Some(date)),
        Some(date) => Err(TransitionError::ConfirmedDateNotPreferred(date)),
    }
}

/// Compute the order that results from `req`
///
/// The returned snapshot is what gets persisted. Comparing its status with
/// the stored one tells the dispatcher whether anything needs to fire.
pub fn apply_update(
    identity: &Identity,
    order: &Order,
    req: &UpdateOrderRequest,
    now: DateTime<Utc>,
) -> Result<Order, TransitionError> {
    let role = authorize(identity, order)?;

    if req.has_admin_fields() && role != Role::Admin {
        return Err(TransitionError::AdminFieldsForbidden);
    }

    let mut next = order.clone();

    if role == Role::Admin {
        if let Some(dates) = &req.preferred_dates {
            if !preferred_dates_valid(dates) {
                return Err(TransitionError::InvalidPreferredDates);
            }
            next.preferred_dates = dates.clone();
        }
        if let Some(helpers) = req.helpers {
            next.helpers = helpers;
        }
        if let Some(hours) = req.estimated_hours {
            next.estimated_hours = hours;
        }
        if let Some(price) = req.total_price {
            next.total_price = price;
        }
    }

    if let Some(to) = req.status {
        let from = order.status;
        check_transition(role, from, to)?;

        if to == OrderStatus::Confirmed {
            if from != OrderStatus::Confirmed {
                next.confirmed_date = match role {
                    Role::Admin => req.confirmed_date.or(order.confirmed_date),
                    _ => resolve_confirmed_date(&next, req.confirmed_date)?,
                };
                next.confirmed_at = Some(now);
            } else if role == Role::Admin && req.confirmed_date.is_some() {
                next.confirmed_date = req.confirmed_date;
            }
        } else if from == OrderStatus::Confirmed && to != OrderStatus::Completed && role == Role::Admin {
            // An admin reopening or rejecting a confirmed order drops the old booking
            next.confirmed_date = None;
            next.confirmed_at = None;
        }
        next.status = to;
    }

    if let Some(notes) = &req.notes {
        let trimmed = notes.trim();
        next.notes = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    next.updated_at = now;
    Ok(next)
}

/// What a DELETE request does to an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePlan {
    /// Customer delete: move to `cancelled` and fire the cancellation effects
    Cancel,
    /// Customer delete of an already cancelled order: nothing to do
    AlreadyCancelled,
    /// Remove the record permanently
    Remove,
}

pub fn plan_delete(identity: &Identity, order: &Order) -> Result<DeletePlan, TransitionError> {
    let role = authorize(identity, order)?;
    let status = order.status;
    match role {
        Role::Admin => Ok(DeletePlan::Remove),
        Role::Company => match status {
            OrderStatus::Completed | OrderStatus::Cancelled => Ok(DeletePlan::Remove),
            _ => Err(TransitionError::NotDeletable { role, status }),
        },
        Role::User => match status {
            OrderStatus::Pending | OrderStatus::Confirmed => Ok(DeletePlan::Cancel),
            OrderStatus::Cancelled => Ok(DeletePlan::AlreadyCancelled),
            OrderStatus::Completed | OrderStatus::Declined => {
                Err(TransitionError::NotDeletable { role, status })
            }
        },
    }
}

/// Check that `identity` may attach a review with `rating` to `order`
pub fn check_review(identity: &Identity, order: &Order, rating: u8) -> Result<(), TransitionError> {
    if identity.role != Role::User || !order.is_customer(&identity.account_id) {
        return Err(TransitionError::NotReviewer);
    }
    if order.status != OrderStatus::Completed {
        return Err(TransitionError::ReviewNotAllowed(order.status));
    }
    if order.review.is_some() {
        return Err(TransitionError::AlreadyReviewed);
    }
    if !RATING_RANGE.contains(&rating) {
        return Err(TransitionError::InvalidRating(rating));
    }
    Ok(())
}

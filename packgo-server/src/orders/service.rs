//! Order use cases
//!
//! Every mutation follows the same path: load, validate with the transition
//! rules, persist, then hand the planned effects to the dispatcher on a
//! background task. The caller gets the persisted result immediately; the
//! returned [`Mutation::effects`] handle is only awaited by tests.

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

use shared::error::{AppError, ErrorCode};
use shared::order::{
    CreateOrderRequest, DeleteAction, DeleteOrderResponse, Order, OrderStatus, OrderView, Review,
    SubmitReviewRequest, UpdateOrderRequest, preferred_dates_valid,
};
use shared::util::new_order_id;
use shared::{Identity, Role};

use super::dispatch::{
    DispatchReport, Dispatcher, Effect, plan_created_effects, plan_review_effects,
    plan_status_effects,
};
use super::transition::{self, DeletePlan};
use crate::db::{AccountDirectory, OrderRepository};
use crate::error::{ServiceError, ServiceResult};

/// Result of a mutation plus the handle of its side-effect task
pub struct Mutation<T> {
    pub value: T,
    pub effects: Option<JoinHandle<DispatchReport>>,
}

impl<T> Mutation<T> {
    fn quiet(value: T) -> Self {
        Self {
            value,
            effects: None,
        }
    }
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    directory: Arc<dyn AccountDirectory>,
    dispatcher: Arc<Dispatcher>,
}

fn order_not_found(id: &str) -> ServiceError {
    AppError::new(ErrorCode::OrderNotFound)
        .with_detail("orderId", id)
        .into()
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        directory: Arc<dyn AccountDirectory>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            orders,
            directory,
            dispatcher,
        }
    }

    fn spawn_effects(&self, order: Order, effects: Vec<Effect>) -> Option<JoinHandle<DispatchReport>> {
        if effects.is_empty() {
            return None;
        }
        let dispatcher = self.dispatcher.clone();
        Some(tokio::spawn(async move {
            dispatcher.run(&order, &effects).await
        }))
    }

    async fn load(&self, id: &str) -> ServiceResult<Order> {
        self.orders
            .find(id)
            .await?
            .ok_or_else(|| order_not_found(id))
    }

    /// Persist `next`; a concurrent hard delete surfaces as not-found
    async fn store(&self, next: &Order) -> ServiceResult<()> {
        if self.orders.update(next).await? {
            Ok(())
        } else {
            Err(order_not_found(&next.id))
        }
    }

    /// GET /orders/{id}
    pub async fn get(&self, identity: &Identity, id: &str) -> ServiceResult<OrderView> {
        let order = self.load(id).await?;
        transition::authorize(identity, &order)?;

        let (customer, company) = futures::join!(
            self.directory.account(&order.customer_id),
            self.directory.company(&order.company_id),
        );
        let customer = customer.unwrap_or_else(|e| {
            tracing::warn!(order_id = %order.id, error = %e, "Customer lookup failed");
            None
        });
        let company = company.unwrap_or_else(|e| {
            tracing::warn!(order_id = %order.id, error = %e, "Company lookup failed");
            None
        });

        Ok(OrderView {
            customer: customer.as_ref().map(Into::into),
            company: company.as_ref().map(Into::into),
            order,
        })
    }

    /// GET /orders
    pub async fn list(&self, identity: &Identity) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_for(identity).await?)
    }

    /// POST /orders
    pub async fn create(
        &self,
        identity: &Identity,
        req: CreateOrderRequest,
    ) -> ServiceResult<Mutation<Order>> {
        if identity.role != Role::User {
            return Err(AppError::with_message(
                ErrorCode::RoleRequired,
                "Only customers can submit move requests",
            )
            .with_detail("role", "user")
            .into());
        }
        if !preferred_dates_valid(&req.preferred_dates) {
            return Err(transition::TransitionError::InvalidPreferredDates.into());
        }
        let company = self
            .directory
            .company(&req.company_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::CompanyNotFound).with_detail("companyId", req.company_id.as_str())
            })?;

        let now = Utc::now();
        let order = Order {
            id: new_order_id(),
            customer_id: identity.account_id.clone(),
            company_id: company.id,
            company_account_id: company.account_id,
            origin: req.origin,
            destination: req.destination,
            preferred_dates: req.preferred_dates,
            confirmed_date: None,
            helpers: req.helpers,
            estimated_hours: req.estimated_hours,
            total_price: req.total_price,
            status: OrderStatus::Pending,
            notes: req
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            review: None,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
        };
        self.orders.insert(&order).await?;

        tracing::info!(order_id = %order.id, account_id = %identity.account_id, company_id = %order.company_id, "Order created");

        let effects = self.spawn_effects(order.clone(), plan_created_effects(&order));
        Ok(Mutation {
            value: order,
            effects,
        })
    }

    /// PUT /orders/{id}
    pub async fn update(
        &self,
        identity: &Identity,
        id: &str,
        req: UpdateOrderRequest,
    ) -> ServiceResult<Mutation<Order>> {
        let before = self.load(id).await?;
        let next = transition::apply_update(identity, &before, &req, Utc::now())?;
        self.store(&next).await?;

        if before.status != next.status {
            tracing::info!(
                order_id = %next.id,
                account_id = %identity.account_id,
                role = %identity.role,
                from = %before.status,
                status = %next.status,
                "Order status changed"
            );
        }

        let effects = self.spawn_effects(next.clone(), plan_status_effects(&before, &next));
        Ok(Mutation {
            value: next,
            effects,
        })
    }

    /// DELETE /orders/{id}
    pub async fn delete(
        &self,
        identity: &Identity,
        id: &str,
    ) -> ServiceResult<Mutation<DeleteOrderResponse>> {
        let before = self.load(id).await?;

        match transition::plan_delete(identity, &before)? {
            DeletePlan::Remove => {
                if !self.orders.delete(id).await? {
                    return Err(order_not_found(id));
                }
                tracing::info!(order_id = %id, account_id = %identity.account_id, role = %identity.role, status = %before.status, "Order deleted");
                Ok(Mutation::quiet(DeleteOrderResponse {
                    action: DeleteAction::Deleted,
                    order_id: id.to_string(),
                    order: None,
                }))
            }
            DeletePlan::AlreadyCancelled => Ok(Mutation::quiet(DeleteOrderResponse {
                action: DeleteAction::Cancelled,
                order_id: id.to_string(),
                order: Some(before),
            })),
            DeletePlan::Cancel => {
                let mut next = before.clone();
                next.status = OrderStatus::Cancelled;
                next.updated_at = Utc::now();
                self.store(&next).await?;

                tracing::info!(order_id = %id, account_id = %identity.account_id, from = %before.status, "Order cancelled by customer");

                let effects = self.spawn_effects(next.clone(), plan_status_effects(&before, &next));
                Ok(Mutation {
                    value: DeleteOrderResponse {
                        action: DeleteAction::Cancelled,
                        order_id: id.to_string(),
                        order: Some(next),
                    },
                    effects,
                })
            }
        }
    }

    /// POST /orders/{id}/review
    pub async fn review(
        &self,
        identity: &Identity,
        id: &str,
        req: SubmitReviewRequest,
    ) -> ServiceResult<Mutation<Order>> {
        let before = self.load(id).await?;
        transition::check_review(identity, &before, req.rating)?;

        let now = Utc::now();
        let mut next = before;
        next.review = Some(Review {
            rating: req.rating,
            comment: req
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: now,
        });
        next.updated_at = now;
        self.store(&next).await?;

        tracing::info!(order_id = %id, account_id = %identity.account_id, rating = req.rating, "Review submitted");

        let effects = self.spawn_effects(next.clone(), plan_review_effects(&next));
        Ok(Mutation {
            value: next,
            effects,
        })
    }
}

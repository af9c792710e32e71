//! PostgreSQL storage
//!
//! Each row keeps the full document in a JSONB column plus the columns used
//! for access filtering and ordering.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use shared::account::{Account, Company};
use shared::order::Order;
use shared::{Identity, Role};

use super::{AccountDirectory, OrderRepository};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn find(&self, id: &str) -> Result<Option<Order>, BoxError> {
        let row: Option<(Json<Order>,)> =
            sqlx::query_as("SELECT document FROM orders WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(doc,)| doc.0))
    }

    async fn list_for(&self, identity: &Identity) -> Result<Vec<Order>, BoxError> {
        let query = match identity.role {
            Role::Admin => sqlx::query_as::<_, (Json<Order>,)>(
                "SELECT document FROM orders ORDER BY created_at DESC",
            ),
            Role::User => sqlx::query_as(
                "SELECT document FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
            )
            .bind(&identity.account_id),
            Role::Company => sqlx::query_as(
                "SELECT document FROM orders WHERE company_account_id = $1 ORDER BY created_at DESC",
            )
            .bind(&identity.account_id),
        };
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(doc,)| doc.0).collect())
    }

    async fn insert(&self, order: &Order) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, company_account_id, status, created_at, document)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(&order.company_account_id)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(Json(order))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<bool, BoxError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, company_account_id = $3, document = $4
            WHERE id = $1
            "#,
        )
        .bind(&order.id)
        .bind(order.status.as_str())
        .bind(&order.company_account_id)
        .bind(Json(order))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, BoxError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct PgAccountDirectory {
    pool: PgPool,
}

impl PgAccountDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn account(&self, id: &str) -> Result<Option<Account>, BoxError> {
        let row: Option<(Json<Account>,)> =
            sqlx::query_as("SELECT document FROM accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(doc,)| doc.0))
    }

    async fn company(&self, id: &str) -> Result<Option<Company>, BoxError> {
        let row: Option<(Json<Company>,)> =
            sqlx::query_as("SELECT document FROM companies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(doc,)| doc.0))
    }
}

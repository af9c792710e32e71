//! Storage access layer
//!
//! Orders are stored as whole documents. Accounts and companies are owned by
//! the profile layer and only read here.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use shared::Identity;
use shared::account::{Account, Company};
use shared::order::Order;

pub use memory::{MemoryAccountDirectory, MemoryOrderRepository};
pub use postgres::{PgAccountDirectory, PgOrderRepository};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find(&self, id: &str) -> Result<Option<Order>, BoxError>;

    /// Orders visible to `identity`, newest first
    ///
    /// Customers see their own orders, companies the orders assigned to their
    /// account, admins everything.
    async fn list_for(&self, identity: &Identity) -> Result<Vec<Order>, BoxError>;

    async fn insert(&self, order: &Order) -> Result<(), BoxError>;

    /// Replace the stored document. Returns false if the order no longer exists.
    async fn update(&self, order: &Order) -> Result<bool, BoxError>;

    /// Returns false if the order did not exist
    async fn delete(&self, id: &str) -> Result<bool, BoxError>;
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn account(&self, id: &str) -> Result<Option<Account>, BoxError>;
    async fn company(&self, id: &str) -> Result<Option<Company>, BoxError>;
}

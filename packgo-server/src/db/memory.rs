//! In-memory storage for development and tests

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;

use shared::account::{Account, Company};
use shared::order::Order;
use shared::{Identity, Role};

use super::{AccountDirectory, OrderRepository};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone, Default)]
pub struct MemoryOrderRepository {
    orders: Arc<DashMap<String, Order>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn find(&self, id: &str) -> Result<Option<Order>, BoxError> {
        Ok(self.orders.get(id).map(|o| o.value().clone()))
    }

    async fn list_for(&self, identity: &Identity) -> Result<Vec<Order>, BoxError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| match identity.role {
                Role::Admin => true,
                Role::User => o.is_customer(&identity.account_id),
                Role::Company => o.is_company_account(&identity.account_id),
            })
            .map(|o| o.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn insert(&self, order: &Order) -> Result<(), BoxError> {
        if self.orders.contains_key(&order.id) {
            return Err(format!("order {} already exists", order.id).into());
        }
        self.orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<bool, BoxError> {
        match self.orders.get_mut(&order.id) {
            Some(mut stored) => {
                *stored = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, BoxError> {
        Ok(self.orders.remove(id).is_some())
    }
}

/// Accounts and companies loaded from a seed file or inserted by tests
#[derive(Clone, Default)]
pub struct MemoryAccountDirectory {
    accounts: Arc<DashMap<String, Account>>,
    companies: Arc<DashMap<String, Company>>,
}

#[derive(Deserialize)]
struct SeedFile {
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    companies: Vec<Company>,
}

impl MemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{ "accounts": [...], "companies": [...] }`
    pub fn from_seed_file(path: &str) -> Result<Self, BoxError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: SeedFile = serde_json::from_str(&raw)?;
        let directory = Self::new();
        for account in seed.accounts {
            directory.insert_account(account);
        }
        for company in seed.companies {
            directory.insert_company(company);
        }
        tracing::info!(
            path,
            accounts = directory.accounts.len(),
            companies = directory.companies.len(),
            "Seed directory loaded"
        );
        Ok(directory)
    }

    pub fn insert_account(&self, account: Account) {
        self.accounts.insert(account.id.clone(), account);
    }

    pub fn insert_company(&self, company: Company) {
        self.companies.insert(company.id.clone(), company);
    }
}

#[async_trait]
impl AccountDirectory for MemoryAccountDirectory {
    async fn account(&self, id: &str) -> Result<Option<Account>, BoxError> {
        Ok(self.accounts.get(id).map(|a| a.value().clone()))
    }

    async fn company(&self, id: &str) -> Result<Option<Company>, BoxError> {
        Ok(self.companies.get(id).map(|c| c.value().clone()))
    }
}

//! Repository contracts consumed by the order services.
//!
//! The services only talk to these traits. Each trait has a sea-orm backed
//! implementation in the submodules; tests substitute mocks.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::errors::ServiceError;
use crate::models::{
    Customer, CustomerLookup, CustomerUpdate, NewCustomer, NewOrder, Order, OrderStatus,
    OrderWithOwner, Product, StockReservation, TenantSummary, TenantWithCredential,
};

pub mod customer_repository;
pub mod order_repository;
pub mod product_repository;
pub mod tenant_repository;

#[cfg(test)]
pub mod mocks;

pub use customer_repository::SeaOrmCustomerRepository;
pub use order_repository::SeaOrmOrderRepository;
pub use product_repository::SeaOrmProductRepository;
pub use tenant_repository::SeaOrmTenantRepository;

/// Tenant Lookup.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<TenantSummary>, ServiceError>;

    /// Same as [`find_by_slug`](Self::find_by_slug) but also loads the encrypted
    /// payment credential.
    async fn find_by_slug_with_token(
        &self,
        slug: &str,
    ) -> Result<Option<TenantWithCredential>, ServiceError>;
}

/// Customer Directory. Every lookup is scoped to one tenant.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_key(
        &self,
        tenant_id: i32,
        lookup: &CustomerLookup,
    ) -> Result<Option<Customer>, ServiceError>;

    async fn create(&self, input: NewCustomer) -> Result<Customer, ServiceError>;

    async fn update(&self, id: i32, input: CustomerUpdate) -> Result<(), ServiceError>;
}

/// Product Catalog.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Returns the products matching `ids`. Ids that do not exist are simply
    /// absent from the result; no tenant filtering is applied here.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, ServiceError>;
}

/// Order Store.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order and applies every stock reservation in one
    /// transaction. If any reservation cannot be satisfied nothing is written
    /// and an insufficient-stock validation error is returned.
    async fn create(
        &self,
        order: NewOrder,
        reservations: &[StockReservation],
    ) -> Result<i32, ServiceError>;

    async fn find_by_id_with_tenant(&self, id: i32)
        -> Result<Option<OrderWithOwner>, ServiceError>;

    /// Persists the new status and bumps `updated_at`.
    async fn update_status(&self, id: i32, status: &OrderStatus) -> Result<Order, ServiceError>;
}

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

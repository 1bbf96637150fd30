//! mockall doubles for the repository traits, shared by the service tests.

use async_trait::async_trait;
use mockall::mock;

use super::{CustomerRepository, OrderRepository, ProductRepository, TenantRepository};
use crate::errors::ServiceError;
use crate::models::{
    Customer, CustomerLookup, CustomerUpdate, NewCustomer, NewOrder, Order, OrderStatus,
    OrderWithOwner, Product, StockReservation, TenantSummary, TenantWithCredential,
};

mock! {
    pub TenantRepo {}

    #[async_trait]
    impl TenantRepository for TenantRepo {
        async fn find_by_slug(&self, slug: &str) -> Result<Option<TenantSummary>, ServiceError>;
        async fn find_by_slug_with_token(
            &self,
            slug: &str,
        ) -> Result<Option<TenantWithCredential>, ServiceError>;
    }
}

mock! {
    pub CustomerRepo {}

    #[async_trait]
    impl CustomerRepository for CustomerRepo {
        async fn find_by_key(
            &self,
            tenant_id: i32,
            lookup: &CustomerLookup,
        ) -> Result<Option<Customer>, ServiceError>;
        async fn create(&self, input: NewCustomer) -> Result<Customer, ServiceError>;
        async fn update(&self, id: i32, input: CustomerUpdate) -> Result<(), ServiceError>;
    }
}

mock! {
    pub ProductRepo {}

    #[async_trait]
    impl ProductRepository for ProductRepo {
        async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, ServiceError>;
    }
}

mock! {
    pub OrderRepo {}

    #[async_trait]
    impl OrderRepository for OrderRepo {
        async fn create(
            &self,
            order: NewOrder,
            reservations: &[StockReservation],
        ) -> Result<i32, ServiceError>;
        async fn find_by_id_with_tenant(
            &self,
            id: i32,
        ) -> Result<Option<OrderWithOwner>, ServiceError>;
        async fn update_status(&self, id: i32, status: &OrderStatus) -> Result<Order, ServiceError>;
    }
}

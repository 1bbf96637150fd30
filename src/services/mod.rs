// Order pipelines
pub mod orders;
pub mod order_status;

// Shared customer deduplication
pub mod customers;

// Storefront checkout
pub mod commerce;

// Payment provider integration
pub mod payment_credentials;
pub mod payments;

// Service factory for dependency injection
pub mod factory;

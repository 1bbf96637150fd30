//! Domain types shared by the repositories and the order services.

pub mod customer;
pub mod order;
pub mod product;
pub mod tenant;

pub use customer::{Customer, CustomerContact, CustomerLookup, CustomerUpdate, DedupKey, NewCustomer};
pub use order::{
    NewOrder, Order, OrderItem, OrderStatus, OrderWithOwner, PaymentMethod, StockReservation,
};
pub use product::{Product, ResolvedStock, SizeVariant};
pub use tenant::{TenantSummary, TenantWithCredential};

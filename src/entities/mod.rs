//! sea-orm entity definitions backing the repository implementations.

pub mod customer;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_size;
pub mod tenant;

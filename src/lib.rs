//! Storefront Orders Library
//!
//! Order and checkout transaction core for a multi-tenant storefront:
//! admin order entry, public checkout with payment preferences, and the
//! order lifecycle.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod models;
pub mod repositories;
pub mod services;

pub use errors::{ErrorKind, ServiceError};
pub use services::{
    commerce::CheckoutService, customers::CustomerService, order_status::OrderStatusService,
    orders::OrderService,
};

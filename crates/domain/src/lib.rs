//! Shared domain types for the storefront client.
//!
//! This crate provides the value objects and records exchanged between the
//! cart engine, the checkout flow, and the remote service client:
//! - `Money` and identifier newtypes
//! - `CartItem` and the add-to-cart input shape
//! - `Customer` billing details with boundary validation
//! - `PaymentOutcome` and the order records

pub mod customer;
pub mod ids;
pub mod item;
pub mod money;
pub mod order;
pub mod payment;
pub mod user;

pub use customer::{Customer, CustomerError};
pub use ids::{AuthToken, ProductId};
pub use item::{CartItem, ItemError, NewCartItem};
pub use money::Money;
pub use order::{OrderDraft, PlacedOrder};
pub use payment::{PaymentError, PaymentMethod, PaymentOutcome, PaymentStatus};
pub use user::UserRecord;

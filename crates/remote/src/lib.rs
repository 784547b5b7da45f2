//! Client for the remote cart/order service.
//!
//! Each endpoint family is a trait (`CartApi`, `PaymentApi`, `OrderApi`,
//! `AuthApi`) so the engines can be driven against the real HTTP service or
//! an in-memory double. The HTTP implementation covers:
//!
//! - `GET/POST/PUT/DELETE /api/cart`, `DELETE /api/cart/clear`
//! - `POST /api/payment/create-order`, `POST /api/payment/verify-payment`
//! - `POST /api/orders`, `GET /api/orders/myorders`
//! - `POST /api/auth/login`, `POST /api/auth/register`
//!
//! Authenticated requests carry `Authorization: Bearer <token>`.

pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod orders;
pub mod payment;

pub use auth::{AuthApi, InMemoryAuthApi};
pub use cart::{CartApi, InMemoryCartApi};
pub use config::RemoteConfig;
pub use error::{RemoteError, Result};
pub use http::HttpRemote;
pub use orders::{InMemoryOrderApi, OrderApi};
pub use payment::{GatewayOrder, InMemoryPaymentApi, PaymentApi, PaymentConfirmation};

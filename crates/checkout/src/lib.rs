//! Checkout flow for the storefront client.
//!
//! The flow runs in three parts, in order:
//! 1. [`CheckoutCoordinator`] — fixes the item set (full cart or a single
//!    buy-now item), computes the total, and validates billing details.
//!    Purely local.
//! 2. [`PaymentFlow`] — the payment stage state machine. A deferred method
//!    goes straight to placement with a pending outcome; a gateway-mediated
//!    method creates a gateway order, waits on the gateway's single-shot
//!    confirmation channel, and has the signature verified remotely before
//!    anything is placed.
//! 3. Order placement — submits the finalized order and, for full-cart
//!    checkouts, clears the cart. A placement failure is retryable without
//!    re-running the gateway.

pub mod coordinator;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod placement;
pub mod selection;
pub mod state;

pub use coordinator::{CheckoutCoordinator, CheckoutHandoff};
pub use error::{CheckoutError, Result};
pub use flow::PaymentFlow;
pub use gateway::{GatewayBehavior, GatewayError, InMemoryGateway, PaymentGateway};
pub use placement::OrderConfirmation;
pub use selection::CheckoutSelection;
pub use state::PaymentState;

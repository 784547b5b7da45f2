//! Checkout error types.

use cart::CartError;
use domain::{CustomerError, PaymentError};
use remote::RemoteError;
use thiserror::Error;

use crate::state::PaymentState;

/// Errors that can occur during checkout and payment.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A required billing field is missing; user-correctable.
    #[error(transparent)]
    IncompleteForm(#[from] CustomerError),

    /// Billing details were never validated before proceeding.
    #[error("billing details have not been validated")]
    NotValidated,

    /// No payment method has been selected.
    #[error("no payment method selected")]
    MethodRequired,

    /// The payment stage is not in a state that allows the operation.
    #[error("invalid payment state: cannot {action} from {state}")]
    InvalidState {
        state: PaymentState,
        action: &'static str,
    },

    /// The gateway session failed, timed out, or was dismissed. The order
    /// was not placed.
    #[error("gateway failure: {0}")]
    Gateway(String),

    /// The remote service rejected the gateway confirmation. The order was
    /// not placed.
    #[error("payment verification failed: {0}")]
    Verification(#[source] RemoteError),

    /// Order creation failed after the payment outcome was already
    /// computed; the outcome is preserved and placement can be retried.
    #[error("order submission failed: {0}")]
    OrderSubmission(#[source] RemoteError),

    /// An invalid payment outcome was about to be constructed.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Clearing the cart after placement failed locally.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),
}

/// Result type for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;

//! Payment gateway collaborator.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use domain::Customer;
use remote::{GatewayOrder, PaymentConfirmation};
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors the gateway session can resolve to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The user closed the gateway session without paying.
    #[error("gateway session dismissed")]
    Dismissed,

    /// The gateway reported an error.
    #[error("gateway error: {0}")]
    Failed(String),
}

/// What a gateway session resolves to.
pub type GatewayResult = std::result::Result<PaymentConfirmation, GatewayError>;

/// The third-party payment collaborator, opaque beyond this surface.
///
/// `open` starts a gateway session for an order and returns a single-shot
/// channel that resolves at most once: with a signed confirmation on
/// success, with a [`GatewayError`] on failure, or never (the payment
/// stage guards the wait with a timeout). A dropped sender means the user
/// dismissed the session.
pub trait PaymentGateway: Send + Sync {
    /// Opens a gateway session, prefilled with the customer's contact
    /// details.
    fn open(&self, order: &GatewayOrder, prefill: &Customer) -> oneshot::Receiver<GatewayResult>;
}

/// How the in-memory gateway resolves each session.
#[derive(Debug, Clone)]
pub enum GatewayBehavior {
    /// Resolve with a correctly signed confirmation.
    Approve,

    /// Drop the channel, as a user closing the gateway does.
    Dismiss,

    /// Resolve with a gateway error.
    Fail(String),

    /// Never resolve; the caller's timeout must fire.
    Hang,

    /// Resolve with a forged signature.
    Tamper,
}

type Signer = dyn Fn(&str, &str) -> String + Send + Sync;

/// In-memory gateway for testing.
///
/// Signs approvals with the signer it is given, so pairing it with
/// [`remote::InMemoryPaymentApi::signature_for`] produces confirmations
/// that verify.
pub struct InMemoryGateway {
    behavior: RwLock<GatewayBehavior>,
    signer: Arc<Signer>,
    next_payment: AtomicU32,
    opened: AtomicUsize,
    // Held senders keep hung sessions pending instead of dropped.
    held: Mutex<Vec<oneshot::Sender<GatewayResult>>>,
}

impl InMemoryGateway {
    /// Creates a gateway that approves every session, signing with
    /// `signer`.
    pub fn approving(signer: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        Self {
            behavior: RwLock::new(GatewayBehavior::Approve),
            signer: Arc::new(signer),
            next_payment: AtomicU32::new(0),
            opened: AtomicUsize::new(0),
            held: Mutex::new(Vec::new()),
        }
    }

    /// Changes how subsequent sessions resolve.
    pub fn set_behavior(&self, behavior: GatewayBehavior) {
        *self.behavior.write().unwrap() = behavior;
    }

    /// Number of sessions opened.
    pub fn opened_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for InMemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGateway")
            .field("behavior", &*self.behavior.read().unwrap())
            .field("opened", &self.opened_count())
            .finish()
    }
}

impl PaymentGateway for InMemoryGateway {
    fn open(&self, order: &GatewayOrder, _prefill: &Customer) -> oneshot::Receiver<GatewayResult> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        match &*self.behavior.read().unwrap() {
            GatewayBehavior::Approve => {
                let n = self.next_payment.fetch_add(1, Ordering::SeqCst) + 1;
                let payment_id = format!("pay_{n:04}");
                let signature = (self.signer)(&order.id, &payment_id);
                let _ = tx.send(Ok(PaymentConfirmation {
                    gateway_order_id: order.id.clone(),
                    payment_id,
                    signature,
                }));
            }
            GatewayBehavior::Dismiss => drop(tx),
            GatewayBehavior::Fail(message) => {
                let _ = tx.send(Err(GatewayError::Failed(message.clone())));
            }
            GatewayBehavior::Hang => self.held.lock().unwrap().push(tx),
            GatewayBehavior::Tamper => {
                let n = self.next_payment.fetch_add(1, Ordering::SeqCst) + 1;
                let payment_id = format!("pay_{n:04}");
                let _ = tx.send(Ok(PaymentConfirmation {
                    gateway_order_id: order.id.clone(),
                    payment_id,
                    signature: "forged".to_string(),
                }));
            }
        }

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Money;

    fn order() -> GatewayOrder {
        GatewayOrder {
            id: "order_0001".to_string(),
            amount: Money::from_minor(5000),
            currency: "INR".to_string(),
        }
    }

    #[tokio::test]
    async fn test_approve_resolves_with_signed_confirmation() {
        let gateway = InMemoryGateway::approving(|oid, pid| format!("{oid}|{pid}|secret"));
        let confirmation = gateway.open(&order(), &Customer::default()).await.unwrap().unwrap();

        assert_eq!(confirmation.gateway_order_id, "order_0001");
        assert_eq!(
            confirmation.signature,
            format!("order_0001|{}|secret", confirmation.payment_id)
        );
        assert_eq!(gateway.opened_count(), 1);
    }

    #[tokio::test]
    async fn test_dismiss_drops_channel() {
        let gateway = InMemoryGateway::approving(|_, _| String::new());
        gateway.set_behavior(GatewayBehavior::Dismiss);
        let result = gateway.open(&order(), &Customer::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fail_resolves_with_error() {
        let gateway = InMemoryGateway::approving(|_, _| String::new());
        gateway.set_behavior(GatewayBehavior::Fail("declined".to_string()));
        let result = gateway.open(&order(), &Customer::default()).await.unwrap();
        assert_eq!(result, Err(GatewayError::Failed("declined".to_string())));
    }

    #[tokio::test]
    async fn test_hang_keeps_channel_pending() {
        let gateway = InMemoryGateway::approving(|_, _| String::new());
        gateway.set_behavior(GatewayBehavior::Hang);
        let mut rx = gateway.open(&order(), &Customer::default());
        assert!(rx.try_recv().is_err());
        // Still pending rather than closed.
        assert!(matches!(
            rx.try_recv(),
            Err(oneshot::error::TryRecvError::Empty)
        ));
    }
}

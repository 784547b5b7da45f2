//! Payment stage orchestration.

use std::sync::Arc;
use std::time::Duration;

use cart::CartEngine;
use chrono::Utc;
use domain::{PaymentMethod, PaymentOutcome};
use local_store::Session;
use remote::{CartApi, OrderApi, PaymentApi};
use tokio::time::timeout;

use crate::coordinator::CheckoutHandoff;
use crate::error::{CheckoutError, Result};
use crate::gateway::{GatewayError, PaymentGateway};
use crate::placement::{self, OrderConfirmation};
use crate::state::PaymentState;

/// How long the gateway session may stay unresolved before it counts as
/// failed.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(300);

/// Drives one checkout from method selection to order placement.
///
/// A deferred method places the order immediately with a pending outcome.
/// A gateway-mediated method obtains a gateway order handle, waits on the
/// gateway's single-shot confirmation channel under a timeout, has the
/// confirmation verified remotely, and only then places the order. Any
/// gateway or verification failure leaves no order placed and returns the
/// stage to method selection. A placement failure preserves the computed
/// outcome so a retry never re-runs the gateway.
pub struct PaymentFlow<P, O, G, R>
where
    P: PaymentApi,
    O: OrderApi,
    G: PaymentGateway,
    R: CartApi,
{
    payment: Arc<P>,
    orders: Arc<O>,
    gateway: Arc<G>,
    engine: Arc<CartEngine<R>>,
    session: Session,
    handoff: CheckoutHandoff,
    state: PaymentState,
    method: Option<PaymentMethod>,
    outcome: Option<PaymentOutcome>,
    confirmation: Option<OrderConfirmation>,
    gateway_timeout: Duration,
}

impl<P, O, G, R> PaymentFlow<P, O, G, R>
where
    P: PaymentApi,
    O: OrderApi,
    G: PaymentGateway,
    R: CartApi + 'static,
{
    /// Creates a payment flow over a checkout handoff.
    pub fn new(
        payment: Arc<P>,
        orders: Arc<O>,
        gateway: Arc<G>,
        engine: Arc<CartEngine<R>>,
        session: Session,
        handoff: CheckoutHandoff,
    ) -> Self {
        Self {
            payment,
            orders,
            gateway,
            engine,
            session,
            handoff,
            state: PaymentState::default(),
            method: None,
            outcome: None,
            confirmation: None,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }

    /// Overrides the gateway wait timeout.
    pub fn with_gateway_timeout(mut self, gateway_timeout: Duration) -> Self {
        self.gateway_timeout = gateway_timeout;
        self
    }

    /// Returns the current stage state.
    pub fn state(&self) -> PaymentState {
        self.state
    }

    /// Returns the selected payment method, if any.
    pub fn selected_method(&self) -> Option<PaymentMethod> {
        self.method
    }

    /// Returns the confirmation of a completed checkout, if any.
    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    /// Selects (or re-selects) the payment method.
    ///
    /// Re-selecting from `Deferred` discards the pending outcome; a
    /// verified gateway payment cannot be switched away from.
    pub fn select_method(&mut self, method: PaymentMethod) -> Result<()> {
        if self.confirmation.is_some() {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "select a method after placement",
            });
        }
        if !self.state.can_select_method() {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "select a method",
            });
        }

        self.method = Some(method);
        self.outcome = None;
        self.state = PaymentState::AwaitingMethod;
        Ok(())
    }

    /// Confirms the payment and places the order.
    ///
    /// Fails with `MethodRequired` when no method has been selected. After
    /// an `OrderSubmissionFailure` this can be called again to retry
    /// placement with the preserved outcome.
    #[tracing::instrument(skip(self), fields(state = %self.state, total = %self.handoff.total))]
    pub async fn confirm(&mut self) -> Result<OrderConfirmation> {
        if self.confirmation.is_some() {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "confirm a completed checkout",
            });
        }
        if !self.state.can_confirm() {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "confirm",
            });
        }

        // Retry path: the outcome was already computed, only placement
        // remains.
        if self.state.holds_outcome()
            && let Some(outcome) = self.outcome.clone()
        {
            return self.place(outcome).await;
        }

        let method = self.method.ok_or(CheckoutError::MethodRequired)?;
        let outcome = match method {
            PaymentMethod::Deferred => {
                self.state = PaymentState::Deferred;
                PaymentOutcome::deferred()
            }
            PaymentMethod::GatewayMediated => self.run_gateway().await?,
        };

        self.outcome = Some(outcome.clone());
        self.place(outcome).await
    }

    /// Runs the gateway interaction: order handle, single-shot wait,
    /// server-side verification.
    async fn run_gateway(&mut self) -> Result<PaymentOutcome> {
        self.state = PaymentState::GatewayPending;
        let token = self.session.token();

        let gateway_order = match self
            .payment
            .create_gateway_order(token.as_ref(), self.handoff.total)
            .await
        {
            Ok(order) => order,
            Err(err) => {
                return Err(self.fail_gateway(format!("could not create gateway order: {err}")));
            }
        };

        tracing::info!(gateway_order_id = %gateway_order.id, "gateway session opened");
        let receiver = self.gateway.open(&gateway_order, &self.handoff.customer);

        let confirmation = match timeout(self.gateway_timeout, receiver).await {
            Err(_) => return Err(self.fail_gateway("gateway session timed out".to_string())),
            Ok(Err(_)) => return Err(self.fail_gateway(GatewayError::Dismissed.to_string())),
            Ok(Ok(Err(err))) => return Err(self.fail_gateway(err.to_string())),
            Ok(Ok(Ok(confirmation))) => confirmation,
        };

        if let Err(err) = self
            .payment
            .verify_payment(token.as_ref(), &confirmation)
            .await
        {
            metrics::counter!("checkout_payment_failures").increment(1);
            tracing::warn!(%err, "payment verification failed");
            self.state = PaymentState::Failed;
            return Err(CheckoutError::Verification(err));
        }

        let outcome = PaymentOutcome::paid(confirmation.payment_id, Utc::now())?;
        self.state = PaymentState::Verified;
        Ok(outcome)
    }

    async fn place(&mut self, outcome: PaymentOutcome) -> Result<OrderConfirmation> {
        match placement::place(
            self.orders.as_ref(),
            &self.session,
            self.engine.as_ref(),
            &self.handoff,
            outcome,
        )
        .await
        {
            Ok(confirmation) => {
                self.confirmation = Some(confirmation.clone());
                Ok(confirmation)
            }
            Err(err) => {
                // State stays Deferred or Verified; the outcome is kept for
                // a retry that skips the gateway.
                tracing::warn!(%err, state = %self.state, "order placement failed, retry allowed");
                Err(err)
            }
        }
    }

    fn fail_gateway(&mut self, message: String) -> CheckoutError {
        metrics::counter!("checkout_payment_failures").increment(1);
        tracing::warn!(%message, "gateway session failed");
        self.state = PaymentState::Failed;
        CheckoutError::Gateway(message)
    }
}

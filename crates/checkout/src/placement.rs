//! Order placement.

use cart::CartEngine;
use domain::{OrderDraft, PaymentOutcome, PlacedOrder};
use local_store::Session;
use remote::{CartApi, OrderApi};

use crate::coordinator::CheckoutHandoff;
use crate::error::{CheckoutError, Result};

/// Terminal artifact of a successful checkout.
///
/// Carries the snapshot the confirmation view renders; the flow never
/// touches the order again after this point.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    /// The order as created by the remote service.
    pub order: PlacedOrder,

    /// Whether the main cart was cleared (full-cart checkouts only).
    pub cleared_cart: bool,
}

/// Submits the finalized order and, for full-cart checkouts, clears the
/// cart.
///
/// The session token is attached when present; guest checkout submits
/// without one. On failure nothing is cleared, so the caller can retry with
/// the same handoff and outcome.
#[tracing::instrument(skip_all, fields(total = %handoff.total, method = %outcome.method))]
pub async fn place<O, R>(
    orders: &O,
    session: &Session,
    engine: &CartEngine<R>,
    handoff: &CheckoutHandoff,
    outcome: PaymentOutcome,
) -> Result<OrderConfirmation>
where
    O: OrderApi,
    R: CartApi + 'static,
{
    let draft = OrderDraft {
        items: handoff.items.clone(),
        customer: handoff.customer.clone(),
        total_amount: handoff.total,
        payment: outcome,
    };

    let token = session.token();
    let placed = orders
        .place_order(token.as_ref(), &draft)
        .await
        .map_err(CheckoutError::OrderSubmission)?;

    let cleared_cart = handoff.from_full_cart;
    if cleared_cart {
        engine.clear()?;
    }

    metrics::counter!("checkout_orders_placed").increment(1);
    tracing::info!(order_id = ?placed.id, cleared_cart, "order placed");

    Ok(OrderConfirmation {
        order: placed,
        cleared_cart,
    })
}

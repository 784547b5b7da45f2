//! Order records exchanged with the remote service.

use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::item::CartItem;
use crate::money::Money;
use crate::payment::PaymentOutcome;

/// A finalized order as submitted to the order-creation endpoint.
///
/// Assembled only after billing validation and (where applicable) payment
/// verification; never mutated after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Line entries for this order.
    pub items: Vec<CartItem>,

    /// Billing details.
    pub customer: Customer,

    /// Final total in minor units.
    pub total_amount: Money,

    /// Payment result attached to the order.
    pub payment: PaymentOutcome,
}

/// The created order as echoed back by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    /// Identifier assigned by the remote service, when it returns one.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub order: OrderDraft,
}

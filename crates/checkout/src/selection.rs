//! Checkout item selection.

use domain::{CartItem, Money};

/// The item set a checkout operates on.
///
/// Chosen at checkout entry and never persisted: either a snapshot of the
/// full cart, or a single ad-hoc item that bypasses the cart entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutSelection {
    /// The whole cart, snapshotted at checkout entry.
    FullCart(Vec<CartItem>),

    /// A single transient "buy now" item.
    BuyNow(CartItem),
}

impl CheckoutSelection {
    /// Returns the items in this selection.
    pub fn items(&self) -> &[CartItem] {
        match self {
            CheckoutSelection::FullCart(items) => items,
            CheckoutSelection::BuyNow(item) => std::slice::from_ref(item),
        }
    }

    /// Returns true if this checkout originated from the full cart.
    pub fn is_full_cart(&self) -> bool {
        matches!(self, CheckoutSelection::FullCart(_))
    }

    /// Returns true if there is nothing to check out.
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Sum of line totals, counting a zero quantity as one.
    pub fn total(&self) -> Money {
        self.items().iter().map(CartItem::line_total).sum()
    }
}

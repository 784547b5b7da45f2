//! Checkout coordinator.

use cart::CartEngine;
use domain::{CartItem, Customer, Money};
use local_store::Session;
use remote::CartApi;

use crate::error::{CheckoutError, Result};
use crate::selection::CheckoutSelection;

/// Everything the payment stage needs, assembled locally.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutHandoff {
    /// The fixed item set.
    pub items: Vec<CartItem>,

    /// Validated billing details.
    pub customer: Customer,

    /// Final total over the fixed item set.
    pub total: Money,

    /// Whether the checkout originated from the full cart.
    pub from_full_cart: bool,
}

/// Collects billing details and fixes the item set for one checkout.
///
/// The selection is snapshotted at [`begin`](Self::begin): later cart
/// mutations do not affect an in-progress checkout. No network call happens
/// here; checkout is purely local state assembly.
#[derive(Debug)]
pub struct CheckoutCoordinator {
    selection: CheckoutSelection,
    customer: Option<Customer>,
}

impl CheckoutCoordinator {
    /// Begins a checkout over the given selection.
    pub fn begin(selection: CheckoutSelection) -> Self {
        Self {
            selection,
            customer: None,
        }
    }

    /// Begins a full-cart checkout, snapshotting the engine's current
    /// contents.
    pub fn from_cart<R: CartApi + 'static>(engine: &CartEngine<R>) -> Self {
        Self::begin(CheckoutSelection::FullCart(engine.items()))
    }

    /// Begins a buy-now checkout for a single item.
    pub fn buy_now(item: CartItem) -> Self {
        Self::begin(CheckoutSelection::BuyNow(item))
    }

    /// Returns the fixed item set.
    pub fn items(&self) -> &[CartItem] {
        self.selection.items()
    }

    /// Final total over the fixed item set, recomputed on demand.
    pub fn total(&self) -> Money {
        self.selection.total()
    }

    /// Seeds a billing form with the signed-in user's name and email.
    pub fn prefill(session: &Session) -> Customer {
        match session.user() {
            Some(user) => Customer {
                name: user.name,
                email: user.email,
                ..Customer::default()
            },
            None => Customer::default(),
        }
    }

    /// Validates billing details and freezes them for this checkout.
    ///
    /// Fails with `IncompleteForm` on the first empty required field; a
    /// failed validation leaves any previously frozen details untouched.
    pub fn validate(&mut self, customer: Customer) -> Result<()> {
        customer.validate()?;
        self.customer = Some(customer);
        Ok(())
    }

    /// Returns true if billing details have been validated.
    pub fn is_validated(&self) -> bool {
        self.customer.is_some()
    }

    /// Hands the fixed items, frozen customer, and total to the payment
    /// stage. Requires a prior successful [`validate`](Self::validate).
    pub fn proceed(&self) -> Result<CheckoutHandoff> {
        let customer = self.customer.clone().ok_or(CheckoutError::NotValidated)?;
        Ok(CheckoutHandoff {
            items: self.selection.items().to_vec(),
            customer,
            total: self.selection.total(),
            from_full_cart: self.selection.is_full_cart(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CustomerError, ProductId};

    fn item(pid: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(pid),
            name: pid.to_string(),
            image_ref: None,
            unit_price: Money::from_minor(price),
            size: None,
            quantity,
        }
    }

    fn customer() -> Customer {
        Customer {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9999999999".to_string(),
            address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
        }
    }

    #[test]
    fn test_total_over_selection() {
        let coordinator = CheckoutCoordinator::begin(CheckoutSelection::FullCart(vec![
            item("a", 100, 2),
            item("b", 50, 1),
        ]));
        assert_eq!(coordinator.total(), Money::from_minor(250));
    }

    #[test]
    fn test_validate_rejects_incomplete_form() {
        let mut coordinator = CheckoutCoordinator::buy_now(item("a", 100, 1));
        let mut incomplete = customer();
        incomplete.pincode = " ".to_string();

        let result = coordinator.validate(incomplete);
        assert!(matches!(
            result,
            Err(CheckoutError::IncompleteForm(CustomerError::IncompleteForm {
                field: "pincode"
            }))
        ));
        assert!(!coordinator.is_validated());
    }

    #[test]
    fn test_proceed_requires_validation() {
        let coordinator = CheckoutCoordinator::buy_now(item("a", 100, 1));
        assert!(matches!(
            coordinator.proceed(),
            Err(CheckoutError::NotValidated)
        ));
    }

    #[test]
    fn test_proceed_hands_off_frozen_state() {
        let mut coordinator = CheckoutCoordinator::begin(CheckoutSelection::FullCart(vec![
            item("a", 100, 2),
        ]));
        coordinator.validate(customer()).unwrap();

        let handoff = coordinator.proceed().unwrap();
        assert_eq!(handoff.total, Money::from_minor(200));
        assert_eq!(handoff.customer, customer());
        assert!(handoff.from_full_cart);
    }

    #[test]
    fn test_buy_now_handoff_is_not_full_cart() {
        let mut coordinator = CheckoutCoordinator::buy_now(item("a", 4999, 1));
        coordinator.validate(customer()).unwrap();
        let handoff = coordinator.proceed().unwrap();
        assert!(!handoff.from_full_cart);
        assert_eq!(handoff.items.len(), 1);
    }
}

//! Remote order-creation endpoint: trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{AuthToken, OrderDraft, PlacedOrder};

use crate::error::{RemoteError, Result};

/// Operations against the remote order endpoints.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Submits a finalized order. Guest checkout submits without a token.
    async fn place_order(
        &self,
        token: Option<&AuthToken>,
        draft: &OrderDraft,
    ) -> Result<PlacedOrder>;

    /// Fetches the authenticated user's order history, oldest first.
    async fn my_orders(&self, token: &AuthToken) -> Result<Vec<PlacedOrder>>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    placed: Vec<(Option<AuthToken>, PlacedOrder)>,
    next_id: u32,
    fail_on_place: bool,
}

/// In-memory order service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderApi {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderApi {
    /// Creates a new in-memory order service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail the next placement calls.
    pub fn set_fail_on_place(&self, fail: bool) {
        self.state.write().unwrap().fail_on_place = fail;
    }

    /// Returns the number of orders placed.
    pub fn placed_count(&self) -> usize {
        self.state.read().unwrap().placed.len()
    }

    /// Returns the placed drafts with the token each submission carried.
    pub fn placed_orders(&self) -> Vec<(Option<AuthToken>, OrderDraft)> {
        self.state
            .read()
            .unwrap()
            .placed
            .iter()
            .map(|(token, placed)| (token.clone(), placed.order.clone()))
            .collect()
    }
}

#[async_trait]
impl OrderApi for InMemoryOrderApi {
    async fn place_order(
        &self,
        token: Option<&AuthToken>,
        draft: &OrderDraft,
    ) -> Result<PlacedOrder> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_place {
            return Err(RemoteError::Status {
                status: 500,
                message: "order creation failed".to_string(),
            });
        }

        state.next_id += 1;
        let placed = PlacedOrder {
            id: Some(format!("ord-{:04}", state.next_id)),
            order: draft.clone(),
        };
        state.placed.push((token.cloned(), placed.clone()));

        Ok(placed)
    }

    async fn my_orders(&self, token: &AuthToken) -> Result<Vec<PlacedOrder>> {
        let state = self.state.read().unwrap();
        Ok(state
            .placed
            .iter()
            .filter(|(t, _)| t.as_ref() == Some(token))
            .map(|(_, placed)| placed.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Customer, Money, PaymentOutcome};

    fn draft() -> OrderDraft {
        OrderDraft {
            items: Vec::new(),
            customer: Customer::default(),
            total_amount: Money::from_minor(100),
            payment: PaymentOutcome::deferred(),
        }
    }

    #[tokio::test]
    async fn test_place_records_token_and_draft() {
        let api = InMemoryOrderApi::new();
        let token = AuthToken::new("tok");

        let placed = api.place_order(Some(&token), &draft()).await.unwrap();
        assert_eq!(placed.id.as_deref(), Some("ord-0001"));

        let guest = api.place_order(None, &draft()).await.unwrap();
        assert_eq!(guest.id.as_deref(), Some("ord-0002"));

        let orders = api.placed_orders();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].0, Some(token));
        assert_eq!(orders[1].0, None);
    }

    #[tokio::test]
    async fn test_my_orders_scoped_to_token() {
        let api = InMemoryOrderApi::new();
        let asha = AuthToken::new("tok-asha");
        let ravi = AuthToken::new("tok-ravi");

        api.place_order(Some(&asha), &draft()).await.unwrap();
        api.place_order(Some(&ravi), &draft()).await.unwrap();
        api.place_order(Some(&asha), &draft()).await.unwrap();
        api.place_order(None, &draft()).await.unwrap();

        let history = api.my_orders(&asha).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id.as_deref(), Some("ord-0001"));
        assert_eq!(history[1].id.as_deref(), Some("ord-0003"));

        assert!(api.my_orders(&AuthToken::new("tok-unknown")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_on_place() {
        let api = InMemoryOrderApi::new();
        api.set_fail_on_place(true);
        assert!(api.place_order(None, &draft()).await.is_err());
        assert_eq!(api.placed_count(), 0);
    }
}

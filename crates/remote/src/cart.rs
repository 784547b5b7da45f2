//! Remote cart endpoints: trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{AuthToken, CartItem, ProductId};

use crate::error::{RemoteError, Result};

/// Operations against the authenticated remote cart.
///
/// The remote cart is the durable, cross-device record of a signed-in
/// user's cart; the engine treats every call here as best-effort.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetches the authoritative cart for the authenticated user.
    async fn fetch_cart(&self, token: &AuthToken) -> Result<Vec<CartItem>>;

    /// Pushes one updated item to the remote cart.
    async fn sync_item(&self, token: &AuthToken, item: &CartItem) -> Result<()>;

    /// Sets the quantity of an item in the remote cart.
    async fn update_quantity(
        &self,
        token: &AuthToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()>;

    /// Removes an item from the remote cart.
    async fn remove_item(&self, token: &AuthToken, product_id: &ProductId) -> Result<()>;

    /// Empties the remote cart.
    async fn clear(&self, token: &AuthToken) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    items: Vec<CartItem>,
    fail: bool,
    sync_item_calls: Vec<CartItem>,
    update_calls: Vec<(ProductId, u32)>,
    remove_calls: Vec<ProductId>,
    clear_calls: u32,
}

/// In-memory cart service for testing.
///
/// Applies mutations the way the real backend does and records every call
/// so tests can assert on sync traffic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartApi {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartApi {
    /// Creates a new empty in-memory cart service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the remote cart contents (simulating another device).
    pub fn seed_items(&self, items: Vec<CartItem>) {
        self.state.write().unwrap().items = items;
    }

    /// Configures every call to fail until reset.
    pub fn set_fail(&self, fail: bool) {
        self.state.write().unwrap().fail = fail;
    }

    /// Returns the current remote cart contents.
    pub fn items(&self) -> Vec<CartItem> {
        self.state.read().unwrap().items.clone()
    }

    /// Returns the items pushed through `sync_item`.
    pub fn sync_item_calls(&self) -> Vec<CartItem> {
        self.state.read().unwrap().sync_item_calls.clone()
    }

    /// Returns the recorded quantity updates.
    pub fn update_calls(&self) -> Vec<(ProductId, u32)> {
        self.state.read().unwrap().update_calls.clone()
    }

    /// Returns the recorded removals.
    pub fn remove_calls(&self) -> Vec<ProductId> {
        self.state.read().unwrap().remove_calls.clone()
    }

    /// Returns how many times the cart was cleared.
    pub fn clear_calls(&self) -> u32 {
        self.state.read().unwrap().clear_calls
    }

    /// Total number of mutation calls received.
    pub fn mutation_calls(&self) -> usize {
        let state = self.state.read().unwrap();
        state.sync_item_calls.len()
            + state.update_calls.len()
            + state.remove_calls.len()
            + state.clear_calls as usize
    }

    fn check_fail(state: &InMemoryCartState) -> Result<()> {
        if state.fail {
            return Err(RemoteError::Status {
                status: 503,
                message: "cart service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CartApi for InMemoryCartApi {
    async fn fetch_cart(&self, _token: &AuthToken) -> Result<Vec<CartItem>> {
        let state = self.state.read().unwrap();
        Self::check_fail(&state)?;
        Ok(state.items.clone())
    }

    async fn sync_item(&self, _token: &AuthToken, item: &CartItem) -> Result<()> {
        let mut state = self.state.write().unwrap();
        Self::check_fail(&state)?;
        state.sync_item_calls.push(item.clone());

        if let Some(existing) = state
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            *existing = item.clone();
        } else {
            state.items.push(item.clone());
        }
        Ok(())
    }

    async fn update_quantity(
        &self,
        _token: &AuthToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap();
        Self::check_fail(&state)?;
        state.update_calls.push((product_id.clone(), quantity));

        if let Some(existing) = state.items.iter_mut().find(|i| &i.product_id == product_id) {
            existing.quantity = quantity;
        }
        Ok(())
    }

    async fn remove_item(&self, _token: &AuthToken, product_id: &ProductId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        Self::check_fail(&state)?;
        state.remove_calls.push(product_id.clone());
        state.items.retain(|i| &i.product_id != product_id);
        Ok(())
    }

    async fn clear(&self, _token: &AuthToken) -> Result<()> {
        let mut state = self.state.write().unwrap();
        Self::check_fail(&state)?;
        state.clear_calls += 1;
        state.items.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Money;

    fn token() -> AuthToken {
        AuthToken::new("tok")
    }

    fn item(pid: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(pid),
            name: pid.to_string(),
            image_ref: None,
            unit_price: Money::from_minor(100),
            size: None,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_sync_item_upserts() {
        let api = InMemoryCartApi::new();
        api.sync_item(&token(), &item("p1", 1)).await.unwrap();
        api.sync_item(&token(), &item("p1", 3)).await.unwrap();

        let items = api.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(api.sync_item_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_update_remove_clear() {
        let api = InMemoryCartApi::new();
        api.seed_items(vec![item("p1", 1), item("p2", 2)]);

        api.update_quantity(&token(), &ProductId::new("p1"), 5)
            .await
            .unwrap();
        assert_eq!(api.items()[0].quantity, 5);

        api.remove_item(&token(), &ProductId::new("p2")).await.unwrap();
        assert_eq!(api.items().len(), 1);

        api.clear(&token()).await.unwrap();
        assert!(api.items().is_empty());
        assert_eq!(api.clear_calls(), 1);
    }

    #[tokio::test]
    async fn test_fail_knob() {
        let api = InMemoryCartApi::new();
        api.set_fail(true);
        let result = api.fetch_cart(&token()).await;
        assert!(matches!(result, Err(RemoteError::Status { status: 503, .. })));
        assert_eq!(api.mutation_calls(), 0);
    }
}

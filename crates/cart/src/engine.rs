//! The cart engine.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use domain::{CartItem, Money, NewCartItem, ProductId};
use local_store::{keys, LocalStore, Session};
use remote::CartApi;

use crate::error::Result;
use crate::state::CartState;
use crate::sync::{SyncOp, SyncQueue, DEFAULT_RETRY_BACKOFF};

#[derive(Debug, Default)]
struct Inner {
    items: Vec<CartItem>,
    state: CartState,
}

/// Owns the authoritative in-memory cart for the session.
///
/// Mutations update memory and the local mirror synchronously, then hand a
/// best-effort sync op to the background queue. Guest carts (no session
/// token) live purely in memory and the mirror and are never synced.
pub struct CartEngine<R: CartApi> {
    inner: Arc<RwLock<Inner>>,
    remote: Arc<R>,
    store: Arc<dyn LocalStore>,
    session: Session,
    queue: SyncQueue,
}

impl<R: CartApi + 'static> CartEngine<R> {
    /// Creates an engine and spawns its sync worker. The cart starts in
    /// `Loading` state until [`load`](Self::load) completes.
    pub fn new(remote: Arc<R>, store: Arc<dyn LocalStore>, session: Session) -> Self {
        Self::with_retry_backoff(remote, store, session, DEFAULT_RETRY_BACKOFF)
    }

    /// Like [`new`](Self::new) with an explicit sync retry backoff.
    pub fn with_retry_backoff(
        remote: Arc<R>,
        store: Arc<dyn LocalStore>,
        session: Session,
        retry_backoff: Duration,
    ) -> Self {
        let queue = SyncQueue::spawn(Arc::clone(&remote), session.clone(), retry_backoff);
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            remote,
            store,
            session,
            queue,
        }
    }

    /// Loads the cart at session start.
    ///
    /// Authenticated sessions fetch the remote cart; on success it replaces
    /// memory and refreshes the mirror. On remote failure the engine falls
    /// back to the mirror, else an empty cart. Guest sessions use the
    /// mirror only.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<()> {
        let items = match self.session.token() {
            Some(token) => match self.remote.fetch_cart(&token).await {
                Ok(items) => {
                    self.write_mirror(&items)?;
                    items
                }
                Err(err) => {
                    tracing::warn!(%err, "remote cart fetch failed, falling back to mirror");
                    self.read_mirror()?
                }
            },
            None => self.read_mirror()?,
        };

        let mut inner = self.inner.write().unwrap();
        inner.items = items;
        inner.state = CartState::Ready;
        tracing::info!(items = inner.items.len(), "cart loaded");
        Ok(())
    }

    /// Adds an item to the cart.
    ///
    /// A repeat add of the same product accumulates the input's quantity
    /// delta (default 1) onto the existing entry; a first insertion is
    /// always a single unit.
    #[tracing::instrument(skip(self, new_item))]
    pub fn add(&self, new_item: NewCartItem) -> Result<()> {
        let product_id = new_item.resolve_product_id()?;
        let delta = new_item.quantity_delta();

        let updated = {
            let mut inner = self.inner.write().unwrap();
            let updated = match inner
                .items
                .iter_mut()
                .find(|i| i.product_id == product_id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(delta);
                    existing.clone()
                }
                None => {
                    let item = new_item.into_item(product_id);
                    inner.items.push(item.clone());
                    item
                }
            };
            self.write_mirror(&inner.items)?;
            updated
        };

        metrics::counter!("cart_items_added").increment(1);
        self.enqueue(SyncOp::Upsert(updated));
        Ok(())
    }

    /// Sets an item's quantity. A requested quantity of zero or less
    /// removes the item; otherwise the quantity is at least 1.
    #[tracing::instrument(skip(self))]
    pub fn set_quantity(&self, product_id: &ProductId, quantity: i64) -> Result<()> {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        let quantity = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);

        {
            let mut inner = self.inner.write().unwrap();
            if let Some(item) = inner.items.iter_mut().find(|i| &i.product_id == product_id) {
                item.quantity = quantity;
            }
            self.write_mirror(&inner.items)?;
        }

        self.enqueue(SyncOp::SetQuantity(product_id.clone(), quantity));
        Ok(())
    }

    /// Removes an item from the cart.
    #[tracing::instrument(skip(self))]
    pub fn remove(&self, product_id: &ProductId) -> Result<()> {
        {
            let mut inner = self.inner.write().unwrap();
            inner.items.retain(|i| &i.product_id != product_id);
            self.write_mirror(&inner.items)?;
        }

        self.enqueue(SyncOp::Remove(product_id.clone()));
        Ok(())
    }

    /// Empties the cart and its mirror.
    #[tracing::instrument(skip(self))]
    pub fn clear(&self) -> Result<()> {
        {
            let mut inner = self.inner.write().unwrap();
            inner.items.clear();
            self.store.remove(keys::CART)?;
        }

        self.enqueue(SyncOp::Clear);
        Ok(())
    }

    /// Returns the cart contents in insertion order.
    pub fn items(&self) -> Vec<CartItem> {
        self.inner.read().unwrap().items.clone()
    }

    /// Returns the item for `product_id`, if present.
    pub fn get(&self, product_id: &ProductId) -> Option<CartItem> {
        self.inner
            .read()
            .unwrap()
            .items
            .iter()
            .find(|i| &i.product_id == product_id)
            .cloned()
    }

    /// Total quantity across all items, recomputed on every call.
    pub fn total_items(&self) -> u32 {
        self.inner.read().unwrap().items.iter().map(|i| i.quantity).sum()
    }

    /// Total price across all items.
    pub fn total_price(&self) -> Money {
        self.inner
            .read()
            .unwrap()
            .items
            .iter()
            .map(CartItem::line_total)
            .sum()
    }

    /// Number of distinct lines in the cart.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().items.len()
    }

    /// Returns true if the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().items.is_empty()
    }

    /// Returns the engine state.
    pub fn state(&self) -> CartState {
        self.inner.read().unwrap().state
    }

    /// Returns the session handle this engine was built with.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Waits until all pending sync ops have been delivered or dropped.
    /// Useful before teardown and in tests.
    pub async fn sync_settled(&self) {
        self.queue.settled().await;
    }

    fn enqueue(&self, op: SyncOp) {
        if self.session.is_authenticated() {
            self.queue.enqueue(op);
        } else {
            tracing::debug!(?op, "guest session, skipping remote sync");
        }
    }

    fn write_mirror(&self, items: &[CartItem]) -> Result<()> {
        let text = serde_json::to_string(items)?;
        self.store.put(keys::CART, &text)?;
        Ok(())
    }

    fn read_mirror(&self) -> Result<Vec<CartItem>> {
        match self.store.get(keys::CART)? {
            Some(text) => match serde_json::from_str(&text) {
                Ok(items) => Ok(items),
                Err(err) => {
                    tracing::warn!(%err, "discarding malformed cart mirror");
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ItemError;
    use local_store::InMemoryStore;
    use remote::InMemoryCartApi;

    fn new_item(pid: &str, price: i64) -> NewCartItem {
        NewCartItem::new(pid, format!("Product {pid}"), Money::from_minor(price))
    }

    fn guest_engine() -> CartEngine<InMemoryCartApi> {
        let store: Arc<dyn LocalStore> = Arc::new(InMemoryStore::new());
        let session = Session::guest(Arc::clone(&store));
        CartEngine::new(Arc::new(InMemoryCartApi::new()), store, session)
    }

    #[tokio::test]
    async fn test_add_merges_duplicate_product() {
        let engine = guest_engine();
        engine.add(new_item("p1", 100)).unwrap();
        engine.add(new_item("p1", 100)).unwrap();

        assert_eq!(engine.len(), 1);
        assert_eq!(engine.total_items(), 2);
    }

    #[tokio::test]
    async fn test_first_insertion_ignores_delta() {
        let engine = guest_engine();
        let mut item = new_item("p1", 100);
        item.quantity = Some(5);
        engine.add(item).unwrap();

        assert_eq!(engine.total_items(), 1);

        let mut again = new_item("p1", 100);
        again.quantity = Some(5);
        engine.add(again).unwrap();
        assert_eq!(engine.total_items(), 6);
    }

    #[tokio::test]
    async fn test_repeat_adds_saturate_quantity() {
        let engine = guest_engine();
        engine.add(new_item("p1", 100)).unwrap();

        let mut again = new_item("p1", 100);
        again.quantity = Some(u32::MAX);
        engine.add(again.clone()).unwrap();
        assert_eq!(engine.total_items(), u32::MAX);

        engine.add(again).unwrap();
        assert_eq!(engine.total_items(), u32::MAX);
    }

    #[tokio::test]
    async fn test_add_without_identifier_fails() {
        let engine = guest_engine();
        let result = engine.add(NewCartItem::default());
        assert!(matches!(
            result,
            Err(crate::CartError::InvalidItem(ItemError::InvalidItem))
        ));
        assert!(engine.is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes() {
        let engine = guest_engine();
        engine.add(new_item("p1", 100)).unwrap();
        engine.set_quantity(&ProductId::new("p1"), 0).unwrap();
        assert!(engine.is_empty());

        engine.add(new_item("p2", 100)).unwrap();
        engine.set_quantity(&ProductId::new("p2"), -3).unwrap();
        assert!(engine.get(&ProductId::new("p2")).is_none());
    }

    #[tokio::test]
    async fn test_total_items_tracks_quantities() {
        let engine = guest_engine();
        engine.add(new_item("p1", 100)).unwrap();
        engine.add(new_item("p2", 50)).unwrap();
        engine.set_quantity(&ProductId::new("p1"), 3).unwrap();

        assert_eq!(engine.total_items(), 4);
        engine.remove(&ProductId::new("p2")).unwrap();
        assert_eq!(engine.total_items(), 3);
        engine.clear().unwrap();
        assert_eq!(engine.total_items(), 0);
    }

    #[tokio::test]
    async fn test_total_price() {
        let engine = guest_engine();
        engine.add(new_item("p1", 100)).unwrap();
        engine.set_quantity(&ProductId::new("p1"), 2).unwrap();
        engine.add(new_item("p2", 50)).unwrap();

        assert_eq!(engine.total_price(), Money::from_minor(250));
    }

    #[tokio::test]
    async fn test_state_transitions_on_load() {
        let engine = guest_engine();
        assert!(engine.state().is_loading());
        engine.load().await.unwrap();
        assert!(engine.state().is_ready());
    }
}

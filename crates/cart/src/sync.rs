//! Outbound best-effort sync queue.
//!
//! Every local cart mutation enqueues a [`SyncOp`]; a background worker
//! delivers them to the remote cart. Pending ops are coalesced per product
//! (quantity changes fold into a pending insert, later ops supersede
//! earlier ones, a clear supersedes everything), each delivery gets one
//! retry after a short backoff, and an op that still fails is dropped with
//! a warning. Local state is never rolled back.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use domain::{CartItem, ProductId};
use local_store::Session;
use remote::CartApi;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Default backoff before the single redelivery attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// One pending remote-cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOp {
    /// Push the full latest state of one item.
    Upsert(CartItem),

    /// Set the quantity of one item.
    SetQuantity(ProductId, u32),

    /// Remove one item.
    Remove(ProductId),

    /// Empty the remote cart.
    Clear,
}

impl SyncOp {
    /// The product this op concerns, if it is per-product.
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            SyncOp::Upsert(item) => Some(&item.product_id),
            SyncOp::SetQuantity(pid, _) | SyncOp::Remove(pid) => Some(pid),
            SyncOp::Clear => None,
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    pending: Mutex<VecDeque<SyncOp>>,
    busy: AtomicBool,
    notify: Notify,
}

impl Shared {
    /// Adds an op, coalescing it with pending ops it supersedes.
    ///
    /// A quantity change folds into a pending insert rather than replacing
    /// it: the remote has to receive the insert first, or the quantity
    /// update would hit a product it does not know about.
    fn push(&self, op: SyncOp) {
        let mut pending = self.pending.lock().unwrap();
        match op {
            SyncOp::Clear => {
                pending.clear();
                pending.push_back(SyncOp::Clear);
            }
            SyncOp::Upsert(item) => {
                let pid = item.product_id.clone();
                pending.retain(|p| p.product_id() != Some(&pid));
                pending.push_back(SyncOp::Upsert(item));
            }
            SyncOp::SetQuantity(pid, quantity) => {
                for p in pending.iter_mut() {
                    if let SyncOp::Upsert(item) = p
                        && item.product_id == pid
                    {
                        item.quantity = quantity;
                        return;
                    }
                }
                pending.retain(|p| p.product_id() != Some(&pid));
                pending.push_back(SyncOp::SetQuantity(pid, quantity));
            }
            SyncOp::Remove(pid) => {
                pending.retain(|p| p.product_id() != Some(&pid));
                pending.push_back(SyncOp::Remove(pid));
            }
        }
    }

    /// Pops the next op, marking the worker busy in the same critical
    /// section so `is_idle` cannot observe the gap between pop and
    /// delivery.
    fn take(&self) -> Option<SyncOp> {
        let mut pending = self.pending.lock().unwrap();
        let op = pending.pop_front();
        self.busy.store(op.is_some(), Ordering::SeqCst);
        op
    }

    fn done(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    fn is_idle(&self) -> bool {
        let pending = self.pending.lock().unwrap();
        pending.is_empty() && !self.busy.load(Ordering::SeqCst)
    }
}

/// Handle to the outbound sync queue and its worker task.
///
/// Dropping the queue aborts the worker.
#[derive(Debug)]
pub struct SyncQueue {
    shared: Arc<Shared>,
    worker: JoinHandle<()>,
}

impl SyncQueue {
    /// Spawns a worker delivering ops through `remote` with the session's
    /// current token.
    pub fn spawn<R>(remote: Arc<R>, session: Session, retry_backoff: Duration) -> Self
    where
        R: CartApi + 'static,
    {
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);
        let worker = tokio::spawn(async move {
            run_worker(worker_shared, remote, session, retry_backoff).await;
        });

        Self { shared, worker }
    }

    /// Enqueues an op, coalescing it with pending ops for the same product.
    pub fn enqueue(&self, op: SyncOp) {
        self.shared.push(op);
        self.shared.notify.notify_one();
    }

    /// Number of ops waiting for delivery.
    pub fn pending_len(&self) -> usize {
        self.shared.pending.lock().unwrap().len()
    }

    /// Waits until every enqueued op has been delivered or dropped.
    pub async fn settled(&self) {
        while !self.shared.is_idle() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Drop for SyncQueue {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_worker<R>(shared: Arc<Shared>, remote: Arc<R>, session: Session, backoff: Duration)
where
    R: CartApi,
{
    loop {
        while let Some(op) = shared.take() {
            deliver(remote.as_ref(), &session, op, backoff).await;
            shared.done();
        }
        shared.notify.notified().await;
    }
}

async fn deliver<R>(remote: &R, session: &Session, op: SyncOp, backoff: Duration)
where
    R: CartApi,
{
    // The session may have ended between enqueue and delivery.
    let Some(token) = session.token() else {
        tracing::debug!(?op, "dropping sync op for signed-out session");
        return;
    };

    metrics::counter!("cart_sync_attempts").increment(1);
    match attempt(remote, &token, &op).await {
        Ok(()) => {}
        Err(err) => {
            metrics::counter!("cart_sync_retries").increment(1);
            tracing::warn!(%err, ?op, "cart sync failed, retrying once");
            tokio::time::sleep(backoff).await;

            if let Err(err) = attempt(remote, &token, &op).await {
                metrics::counter!("cart_sync_dropped").increment(1);
                tracing::warn!(%err, ?op, "cart sync failed after retry, dropping op");
            }
        }
    }
}

async fn attempt<R>(
    remote: &R,
    token: &domain::AuthToken,
    op: &SyncOp,
) -> remote::Result<()>
where
    R: CartApi,
{
    match op {
        SyncOp::Upsert(item) => remote.sync_item(token, item).await,
        SyncOp::SetQuantity(pid, quantity) => remote.update_quantity(token, pid, *quantity).await,
        SyncOp::Remove(pid) => remote.remove_item(token, pid).await,
        SyncOp::Clear => remote.clear(token).await,
    }
}

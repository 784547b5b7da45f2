//! Cart engine for the storefront client.
//!
//! The engine owns the authoritative in-memory cart for the session. It is
//! optimistic: every mutation lands in memory and in the local mirror
//! synchronously, then a best-effort sync task pushes the change to the
//! remote cart. Remote failures are logged and never roll a mutation back,
//! so a cart action can never appear to lose an item because of a transient
//! network failure.

pub mod engine;
pub mod error;
pub mod state;
pub mod sync;

pub use engine::CartEngine;
pub use error::{CartError, Result};
pub use state::CartState;
pub use sync::{SyncOp, SyncQueue};

//! Key-value store abstraction.

use crate::Result;

/// Well-known store keys.
///
/// Values under both keys are plain JSON text with no schema versioning.
pub mod keys {
    /// Stored session: a serialized user record including the auth token.
    /// Written only by the [`Session`](crate::Session) service.
    pub const USER: &str = "user";

    /// Cart mirror: a serialized array of cart items. Written only by the
    /// cart engine.
    pub const CART: &str = "cart";
}

/// A key-value store whose contents survive process restarts.
///
/// All operations are synchronous and complete before they return; callers
/// order remote calls after store mutations and depend on that. All
/// implementations must be thread-safe (Send + Sync).
pub trait LocalStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the value stored under `key`. Removing an absent key is not
    /// an error.
    fn remove(&self, key: &str) -> Result<()>;
}

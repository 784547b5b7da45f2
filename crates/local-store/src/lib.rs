//! Persistent local storage for the storefront client.
//!
//! This crate provides:
//! - the [`LocalStore`] key-value abstraction that survives restarts and
//!   backs the cart mirror and the stored session
//! - an in-memory implementation for tests and a write-through JSON file
//!   implementation for real use
//! - the [`Session`] service, the sole writer of the stored user record
//!
//! Store mutations are synchronous: callers rely on a mutation having
//! landed before any corresponding remote call is issued.

pub mod error;
pub mod file;
pub mod memory;
pub mod session;
pub mod store;

pub use error::{Result, StoreError};
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use session::{Session, SessionError};
pub use store::{LocalStore, keys};

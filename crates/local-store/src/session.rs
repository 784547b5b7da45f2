//! Session service.

use std::sync::{Arc, RwLock};

use domain::{AuthToken, UserRecord};
use remote::{AuthApi, RemoteError};
use thiserror::Error;

use crate::store::{keys, LocalStore};
use crate::StoreError;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The auth endpoint rejected or failed the request.
    #[error("auth error: {0}")]
    Remote(#[from] RemoteError),

    /// The stored user record could not be written or removed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The user record could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The authenticated-session service.
///
/// Holds the signed-in user for the lifetime of the process and mirrors it
/// under the `user` store key. This service is the only writer of that key;
/// any component may read the token through a shared handle. Clones share
/// the same session.
#[derive(Clone)]
pub struct Session {
    user: Arc<RwLock<Option<UserRecord>>>,
    store: Arc<dyn LocalStore>,
}

impl Session {
    /// Initializes the session from the local store at app start.
    ///
    /// A malformed stored record is discarded (the user is simply signed
    /// out) rather than treated as fatal.
    pub fn init(store: Arc<dyn LocalStore>) -> Result<Self, StoreError> {
        let user = match store.get(keys::USER)? {
            Some(text) => match serde_json::from_str::<UserRecord>(&text) {
                Ok(user) => Some(user),
                Err(err) => {
                    tracing::warn!(%err, "discarding malformed stored session");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            user: Arc::new(RwLock::new(user)),
            store,
        })
    }

    /// Starts a guest session with nothing stored.
    pub fn guest(store: Arc<dyn LocalStore>) -> Self {
        Self {
            user: Arc::new(RwLock::new(None)),
            store,
        }
    }

    /// Returns the signed-in user, if any.
    pub fn user(&self) -> Option<UserRecord> {
        self.user.read().unwrap().clone()
    }

    /// Returns the bearer token of the signed-in user, if any.
    pub fn token(&self) -> Option<AuthToken> {
        self.user.read().unwrap().as_ref().map(|u| u.token.clone())
    }

    /// Returns true if a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.read().unwrap().is_some()
    }

    /// Signs in through the auth collaborator and persists the session.
    #[tracing::instrument(skip(self, auth, password))]
    pub async fn login<A: AuthApi + ?Sized>(
        &self,
        auth: &A,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, SessionError> {
        let user = auth.login(email, password).await?;
        self.persist(&user)?;
        tracing::info!(email, "signed in");
        Ok(user)
    }

    /// Registers a new account, signs it in, and persists the session.
    #[tracing::instrument(skip(self, auth, password))]
    pub async fn register<A: AuthApi + ?Sized>(
        &self,
        auth: &A,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, SessionError> {
        let user = auth.register(name, email, password).await?;
        self.persist(&user)?;
        tracing::info!(email, "registered and signed in");
        Ok(user)
    }

    /// Tears the session down: clears memory and the stored record.
    pub fn logout(&self) -> Result<(), StoreError> {
        *self.user.write().unwrap() = None;
        self.store.remove(keys::USER)
    }

    fn persist(&self, user: &UserRecord) -> Result<(), SessionError> {
        let text = serde_json::to_string(user)?;
        self.store.put(keys::USER, &text)?;
        *self.user.write().unwrap() = Some(user.clone());
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use remote::InMemoryAuthApi;

    fn store() -> Arc<dyn LocalStore> {
        Arc::new(InMemoryStore::new())
    }

    #[test]
    fn test_init_without_stored_user() {
        let session = Session::init(store()).unwrap();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_init_with_stored_user() {
        let store = store();
        store
            .put(
                keys::USER,
                r#"{"name":"Asha Rao","email":"asha@example.com","token":"tok-1"}"#,
            )
            .unwrap();

        let session = Session::init(store).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some(AuthToken::new("tok-1")));
    }

    #[test]
    fn test_init_discards_malformed_record() {
        let store = store();
        store.put(keys::USER, "not json").unwrap();
        let session = Session::init(store).unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_persists_user() {
        let store = store();
        let auth = InMemoryAuthApi::new();
        auth.seed_account("Asha Rao", "asha@example.com", "pw");

        let session = Session::init(store.clone()).unwrap();
        session.login(&auth, "asha@example.com", "pw").await.unwrap();

        assert!(session.is_authenticated());
        let stored = store.get(keys::USER).unwrap().unwrap();
        let record: UserRecord = serde_json::from_str(&stored).unwrap();
        assert_eq!(record.email, "asha@example.com");
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let store = store();
        let auth = InMemoryAuthApi::new();

        let session = Session::init(store.clone()).unwrap();
        let result = session.login(&auth, "nobody@example.com", "pw").await;

        assert!(result.is_err());
        assert!(!session.is_authenticated());
        assert!(store.get(keys::USER).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_store() {
        let store = store();
        let auth = InMemoryAuthApi::new();
        auth.seed_account("Asha Rao", "asha@example.com", "pw");

        let session = Session::init(store.clone()).unwrap();
        session.login(&auth, "asha@example.com", "pw").await.unwrap();
        session.logout().unwrap();

        assert!(!session.is_authenticated());
        assert!(store.get(keys::USER).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_session() {
        let auth = InMemoryAuthApi::new();
        auth.seed_account("Asha Rao", "asha@example.com", "pw");

        let session = Session::init(store()).unwrap();
        let other = session.clone();
        session.login(&auth, "asha@example.com", "pw").await.unwrap();
        assert!(other.is_authenticated());
    }
}

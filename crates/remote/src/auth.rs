//! Remote auth endpoints: trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{AuthToken, UserRecord};
use uuid::Uuid;

use crate::error::{RemoteError, Result};

/// Operations against the remote auth endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a user record with a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<UserRecord>;

    /// Creates an account and signs it in.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserRecord>;
}

#[derive(Debug, Default)]
struct InMemoryAuthState {
    // email -> (name, password)
    accounts: HashMap<String, (String, String)>,
}

/// In-memory auth service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthApi {
    state: Arc<RwLock<InMemoryAuthState>>,
}

impl InMemoryAuthApi {
    /// Creates a new in-memory auth service with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account without going through `register`.
    pub fn seed_account(&self, name: &str, email: &str, password: &str) {
        self.state
            .write()
            .unwrap()
            .accounts
            .insert(email.to_string(), (name.to_string(), password.to_string()));
    }

    fn issue(name: &str, email: &str) -> UserRecord {
        UserRecord {
            name: name.to_string(),
            email: email.to_string(),
            token: AuthToken::new(format!("tok-{}", Uuid::new_v4())),
        }
    }
}

#[async_trait]
impl AuthApi for InMemoryAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<UserRecord> {
        let state = self.state.read().unwrap();
        match state.accounts.get(email) {
            Some((name, stored)) if stored == password => Ok(Self::issue(name, email)),
            _ => Err(RemoteError::InvalidCredentials),
        }
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserRecord> {
        let mut state = self.state.write().unwrap();
        if state.accounts.contains_key(email) {
            return Err(RemoteError::Status {
                status: 409,
                message: "account already exists".to_string(),
            });
        }
        state
            .accounts
            .insert(email.to_string(), (name.to_string(), password.to_string()));
        Ok(Self::issue(name, email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_then_login() {
        let api = InMemoryAuthApi::new();
        let registered = api
            .register("Asha Rao", "asha@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(registered.email, "asha@example.com");

        let logged_in = api.login("asha@example.com", "pw").await.unwrap();
        assert_eq!(logged_in.name, "Asha Rao");
        assert_ne!(logged_in.token, registered.token);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let api = InMemoryAuthApi::new();
        api.seed_account("Asha Rao", "asha@example.com", "pw");
        let result = api.login("asha@example.com", "wrong").await;
        assert!(matches!(result, Err(RemoteError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_register_rejected() {
        let api = InMemoryAuthApi::new();
        api.seed_account("Asha Rao", "asha@example.com", "pw");
        let result = api.register("Asha", "asha@example.com", "pw2").await;
        assert!(matches!(result, Err(RemoteError::Status { status: 409, .. })));
    }
}

//! Authenticated user record.

use serde::{Deserialize, Serialize};

use crate::ids::AuthToken;

/// The signed-in user as returned by the auth endpoints and persisted in
/// the local store under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Account email.
    #[serde(default)]
    pub email: String,

    /// Bearer token for authenticated requests.
    pub token: AuthToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_stored_user_json() {
        let user: UserRecord = serde_json::from_str(
            r#"{"name":"Asha Rao","email":"asha@example.com","token":"tok-1"}"#,
        )
        .unwrap();
        assert_eq!(user.token, AuthToken::new("tok-1"));
        assert_eq!(user.name, "Asha Rao");
    }
}

//! Remote client configuration loaded from environment variables.

/// Remote service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `API_URL` — base URL of the remote service
///   (default: `"http://localhost:5000"`)
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
}

impl RemoteConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("API_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
        }
    }

    /// Creates a configuration pointing at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Joins a path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

//! Trainer configuration

use std::time::Duration;

/// Default server endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000";

/// Default timeout for REST requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed delay between reconnection attempts of the conversation feed.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How long "Thank you!" stays up before the next sentence is fetched.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(2);

/// Authentication methods for requests to the server
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication
    #[default]
    None,

    /// Bearer token authentication
    ///
    /// Includes `Authorization: Bearer {token}` in all requests
    Bearer(String),
}

/// Configuration shared by the training workflow and the conversation feed
#[derive(Clone, Debug)]
pub struct TrainerConfig {
    /// Base URL of the Ava server (e.g., "https://ava.example.com")
    pub endpoint: String,

    /// Authentication method
    pub auth_method: AuthMethod,

    /// Optional timeout for REST requests
    pub timeout: Option<Duration>,

    /// Custom headers sent with each REST request (e.g., a CSRF token)
    pub headers: Vec<(String, String)>,

    /// Trainer whose conversation feed to follow
    pub user_id: Option<u64>,

    /// Delay between feed reconnection attempts
    pub retry_delay: Duration,

    /// Delay between a successful save and fetching the next sentence
    pub reset_delay: Duration,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth_method: AuthMethod::None,
            timeout: Some(DEFAULT_TIMEOUT),
            headers: Vec::new(),
            user_id: None,
            retry_delay: DEFAULT_RETRY_DELAY,
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }
}

impl TrainerConfig {
    /// Create a new configuration for the given server
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the authentication method
    pub fn with_auth(mut self, auth_method: AuthMethod) -> Self {
        self.auth_method = auth_method;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a custom header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set the trainer whose feed to follow
    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set the feed reconnection delay
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Set the delay before fetching the next sentence after a save
    pub fn with_reset_delay(mut self, reset_delay: Duration) -> Self {
        self.reset_delay = reset_delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.endpoint, "http://localhost:4000");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.retry_delay, Duration::from_secs(5));
        assert_eq!(config.reset_delay, Duration::from_secs(2));
        assert_eq!(config.auth_method, AuthMethod::None);
    }

    #[test]
    fn builder_overrides() {
        let config = TrainerConfig::new("https://ava.example.com")
            .with_auth(AuthMethod::Bearer("token".into()))
            .with_header("X-CSRF-Token", "csrf")
            .with_user_id(7)
            .with_retry_delay(Duration::from_millis(250))
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.endpoint, "https://ava.example.com");
        assert_eq!(config.auth_method, AuthMethod::Bearer("token".into()));
        assert_eq!(
            config.headers,
            vec![("X-CSRF-Token".to_string(), "csrf".to_string())]
        );
        assert_eq!(config.user_id, Some(7));
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(config.reset_delay, DEFAULT_RESET_DELAY);
    }
}

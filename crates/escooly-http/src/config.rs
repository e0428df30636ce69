//! Client configuration.

use std::time::Duration;

use escooly_core::ApiUrl;

/// Settings for an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; endpoint paths are appended to it.
    pub base_url: ApiUrl,
    /// Upper bound for a whole request. Exceeding it is a network failure.
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            timeout: Self::DEFAULT_TIMEOUT,
            user_agent: concat!("escooly/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::new(ApiUrl::new("http://localhost:8000").unwrap());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("escooly/"));
    }

    #[test]
    fn overrides() {
        let config = ClientConfig::new(ApiUrl::new("http://localhost:8000").unwrap())
            .with_timeout(Duration::from_millis(250))
            .with_user_agent("escooly-test");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.user_agent, "escooly-test");
    }
}

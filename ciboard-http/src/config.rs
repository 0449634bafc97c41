//! Client configuration.

use std::time::Duration;

/// Settings shared by every request of one [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Root that relative request paths are joined onto. Keep the trailing
    /// slash (`https://host/api/`) so joining appends instead of replacing.
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Sent with every request; `Accept: application/json` by default.
    pub default_headers: Vec<(String, String)>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_headers: vec![("Accept".to_string(), "application/json".to_string())],
            user_agent: format!("ciboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`].
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Whole-request timeout, including reading the body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_ask_for_json() {
        let config = HttpClientConfig::default();
        assert!(config.base_url.is_none());
        assert_eq!(
            config.default_headers,
            vec![("Accept".to_string(), "application/json".to_string())]
        );
        assert!(config.user_agent.starts_with("ciboard/"));
    }

    #[test]
    fn test_builder_appends_headers() {
        let config = HttpClientConfig::builder()
            .connect_timeout(Duration::from_secs(2))
            .default_header("X-Client", "cli")
            .user_agent("ciboard-cli/test")
            .build();

        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.default_headers.len(), 2);
        assert_eq!(config.user_agent, "ciboard-cli/test");
    }
}

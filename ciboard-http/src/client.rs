//! HTTP client implementation.

use http::Method;
use reqwest::Request;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::{HttpClientConfig, RequestBuilder, RequestInterceptor, Response, Result};

/// HTTP client with a base URL and request interceptors.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<HttpClientConfig>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true);

        Ok(Self {
            inner: builder.build()?,
            config: Arc::new(config),
            interceptors: Vec::new(),
        })
    }

    /// Create a client with default configuration rooted at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(HttpClientConfig::builder().base_url(base_url).build())
    }

    /// Add an interceptor that runs on every outgoing request, in order.
    pub fn with_interceptor<I: RequestInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub(crate) fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::GET, url.into())
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::POST, url.into())
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PUT, url.into())
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, url.into())
    }

    /// GET a URL and decode a successful JSON body. Non-success statuses
    /// become [`crate::HttpClientError::Response`].
    pub async fn get_json<T: DeserializeOwned>(&self, url: impl Into<String>) -> Result<T> {
        self.get(url).send().await?.error_for_status()?.json()
    }

    /// Run interceptors, then send the request once.
    pub(crate) async fn execute(&self, mut request: Request) -> Result<Response> {
        for interceptor in &self.interceptors {
            request = interceptor.intercept(request).await?;
        }

        let method = request.method().clone();
        let url = request.url().clone();

        let response = Response::from_reqwest(self.inner.execute(request).await?).await;

        debug!(
            method = %method,
            url = %url,
            status = %response.status(),
            "HTTP request completed"
        );

        Ok(response)
    }
}

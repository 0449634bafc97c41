//! Request interceptors.

use crate::{HttpClientError, Result};
use async_trait::async_trait;
use http::{HeaderName, HeaderValue};
use reqwest::Request;

/// Hook that can rewrite a request before it is sent.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Intercept and optionally modify the request.
    async fn intercept(&self, request: Request) -> Result<Request>;
}

/// Logs each outgoing request at trace level.
#[derive(Debug, Default)]
pub struct LoggingInterceptor {
    log_headers: bool,
}

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log request headers (authorization values are redacted).
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }
}

#[async_trait]
impl RequestInterceptor for LoggingInterceptor {
    async fn intercept(&self, request: Request) -> Result<Request> {
        tracing::trace!(
            method = %request.method(),
            url = %request.url(),
            "Sending HTTP request"
        );

        if self.log_headers {
            for (name, value) in request.headers() {
                if name == http::header::AUTHORIZATION {
                    tracing::trace!(header = %name, "<redacted>");
                } else {
                    tracing::trace!(header = %name, value = ?value, "Request header");
                }
            }
        }

        Ok(request)
    }
}

/// Adds credentials to every request.
pub struct AuthInterceptor {
    header: HeaderName,
    value: HeaderValue,
}

impl AuthInterceptor {
    /// `Authorization: Bearer <token>`.
    pub fn bearer(token: impl AsRef<str>) -> Result<Self> {
        Self::api_key(
            http::header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        )
    }

    /// `Authorization: Basic <base64(user:password)>`.
    pub fn basic(username: impl AsRef<str>, password: impl AsRef<str>) -> Result<Self> {
        use base64::Engine;
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", username.as_ref(), password.as_ref()));
        Self::api_key(
            http::header::AUTHORIZATION.as_str(),
            format!("Basic {}", credentials),
        )
    }

    /// Arbitrary header carrying a key.
    pub fn api_key(header: impl AsRef<str>, key: impl AsRef<str>) -> Result<Self> {
        let header = HeaderName::from_bytes(header.as_ref().as_bytes())
            .map_err(|e| HttpClientError::Interceptor(e.to_string()))?;
        let mut value = HeaderValue::from_str(key.as_ref())
            .map_err(|e| HttpClientError::Interceptor(e.to_string()))?;
        value.set_sensitive(true);
        Ok(Self { header, value })
    }
}

#[async_trait]
impl RequestInterceptor for AuthInterceptor {
    async fn intercept(&self, mut request: Request) -> Result<Request> {
        request
            .headers_mut()
            .insert(self.header.clone(), self.value.clone());
        Ok(request)
    }
}

//! HTTP Client error types.

use thiserror::Error;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The server answered with a non-success status.
    #[error("{status}: {message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// Request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request building error.
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Interceptor error.
    #[error("Interceptor error: {0}")]
    Interceptor(String),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for HttpClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else if e.is_builder() {
            Self::RequestBuild(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

impl From<url::ParseError> for HttpClientError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

impl HttpClientError {
    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Get the HTTP status code if this is a response error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Response body text for status failures.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Response { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_error_carries_status_and_body() {
        let err = HttpClientError::Response {
            status: 404,
            message: "Not found".to_string(),
        };
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.body(), Some("Not found"));
        assert_eq!(err.to_string(), "404: Not found");
    }

    #[test]
    fn test_url_parse_error_maps_to_invalid_url() {
        let err: HttpClientError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, HttpClientError::InvalidUrl(_)));
        assert_eq!(err.status_code(), None);
    }
}

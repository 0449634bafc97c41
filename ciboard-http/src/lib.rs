//! # ciboard HTTP client
//!
//! Thin JSON-over-HTTP client shared by the CI results accessor and the
//! task-execution client. Every call either yields a parsed body or a
//! structured [`HttpClientError`] carrying the status code and response text.
//! There is deliberately no retry layer: callers surface failures to the user.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ciboard_http::{HttpClient, HttpClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(
//!         HttpClientConfig::builder()
//!             .base_url("https://treeherder.mozilla.org/api/")
//!             .build(),
//!     )?;
//!
//!     let jobs: serde_json::Value = client
//!         .get("jobs/")
//!         .query("push_id", "526443")
//!         .send()
//!         .await?
//!         .error_for_status()?
//!         .json()?;
//!
//!     println!("{}", jobs["results"]);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod interceptor;
mod request;
mod response;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use interceptor::{AuthInterceptor, LoggingInterceptor, RequestInterceptor};
pub use request::RequestBuilder;
pub use response::Response;

// Re-export common types
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use ciboard_http::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::interceptor::{AuthInterceptor, LoggingInterceptor, RequestInterceptor};
    pub use crate::request::RequestBuilder;
    pub use crate::response::Response;
    pub use http::{Method, StatusCode};
}

//! Performance comparison error types.

use ciboard_http::HttpClientError;
use std::fmt;
use thiserror::Error;

/// Result type for performance operations.
pub type Result<T> = std::result::Result<T, PerfError>;

/// Which half of a comparison a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Original,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Original => "original",
            Side::New => "new",
        })
    }
}

/// Performance comparison errors.
#[derive(Debug, Error)]
pub enum PerfError {
    /// A summary fetch failed.
    #[error("Error fetching {side} performance data: {source}")]
    Summary {
        side: Side,
        #[source]
        source: HttpClientError,
    },

    /// The comparison parameters are incomplete or inconsistent.
    #[error("{0}")]
    InvalidQuery(String),
}

impl PerfError {
    /// HTTP status code, if the remote side answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Summary { source: HttpClientError::Response { status, .. }, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_message_names_the_side() {
        let err = PerfError::Summary {
            side: Side::New,
            source: HttpClientError::Response {
                status: 503,
                message: "Service Unavailable".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Error fetching new performance data: 503: Service Unavailable"
        );
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(PerfError::InvalidQuery("x".into()).status_code(), None);
    }
}

//! Task-execution client error types.

use ciboard_http::HttpClientError;
use std::fmt;
use thiserror::Error;

/// Result type for task-execution operations.
pub type Result<T> = std::result::Result<T, TaskclusterError>;

/// Task-execution client errors.
#[derive(Debug, Error)]
pub enum TaskclusterError {
    /// Fetching a manifest or task definition failed.
    #[error(transparent)]
    Http(#[from] HttpClientError),

    /// No usable action survived filtering.
    #[error("No actions for task {0}.  The task may be expired.")]
    EmptyActionsManifest(String),

    /// The manifest declares a version other than 1.
    #[error("Wrong version of actions.json, can't continue (got {0})")]
    UnsupportedManifestVersion(u64),

    /// The actions manifest could not be decoded.
    #[error("Invalid actions.json: {0}")]
    InvalidManifest(String),

    /// A named action is missing from the loaded set.
    #[error("'{name}' action is not available for this task.  Available: {available}")]
    ActionNotAvailable {
        /// Requested action name.
        name: String,
        /// Comma separated names of the loaded actions.
        available: String,
    },

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(String),

    /// The action kind is neither `task` nor `hook`.
    #[error("Unsupported action kind: {0}")]
    UnsupportedActionKind(String),

    /// Task creation or hook firing was rejected.
    #[error("{message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Server supplied message.
        message: String,
    },
}

impl TaskclusterError {
    /// Build a [`TaskclusterError::Remote`] from a failed submission,
    /// preferring the `message` field of a JSON error body.
    pub(crate) fn remote(error: HttpClientError) -> Self {
        match error {
            HttpClientError::Response { status, message } => {
                let message = serde_json::from_str::<serde_json::Value>(&message)
                    .ok()
                    .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(String::from))
                    .unwrap_or(message);
                Self::Remote { status, message }
            }
            other => Self::Http(other),
        }
    }

    /// Whether this should be shown as a warning rather than a failure.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::EmptyActionsManifest(_))
    }

    /// HTTP status code, if the remote side answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Http(e) => e.status_code(),
            _ => None,
        }
    }
}

/// Prefix an error for display and drop the diagnostic tail the remote
/// service appends after a `----` separator.
pub fn format_taskcluster_error(error: &dyn fmt::Display) -> String {
    let message = error.to_string();
    let head = match message.find("----") {
        Some(idx) => message[..idx].trim_end(),
        None => message.as_str(),
    };
    format!("Taskcluster: {head}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cuts_at_separator() {
        let err = TaskclusterError::Remote {
            status: 403,
            message: "Client ID does not have sufficient scopes\n\n----\nmethod: createTask".into(),
        };
        assert_eq!(
            format_taskcluster_error(&err),
            "Taskcluster: Client ID does not have sufficient scopes"
        );
    }

    #[test]
    fn test_format_without_separator() {
        assert_eq!(format_taskcluster_error(&"boom"), "Taskcluster: boom");
    }

    #[test]
    fn test_remote_prefers_json_message() {
        let err = TaskclusterError::remote(HttpClientError::Response {
            status: 400,
            message: r#"{"code":"InputError","message":"bad input"}"#.into(),
        });
        assert!(matches!(err, TaskclusterError::Remote { status: 400, ref message } if message == "bad input"));

        let err = TaskclusterError::remote(HttpClientError::Response {
            status: 502,
            message: "Bad Gateway".into(),
        });
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[test]
    fn test_action_not_available_message() {
        let err = TaskclusterError::ActionNotAvailable {
            name: "backfill".into(),
            available: "retrigger, cancel".into(),
        };
        assert_eq!(
            err.to_string(),
            "'backfill' action is not available for this task.  Available: retrigger, cancel"
        );
    }

    #[test]
    fn test_empty_manifest_is_warning() {
        let err = TaskclusterError::EmptyActionsManifest("abc".into());
        assert!(err.is_warning());
        assert_eq!(err.to_string(), "No actions for task abc.  The task may be expired.");
    }
}

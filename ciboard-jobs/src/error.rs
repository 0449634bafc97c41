//! Job model error types.

use ciboard_http::HttpClientError;
use ciboard_taskcluster::TaskclusterError;
use ciboard_validation::PayloadError;
use thiserror::Error;

/// Result type for job operations.
pub type Result<T> = std::result::Result<T, JobsError>;

/// Job model errors.
#[derive(Debug, Error)]
pub enum JobsError {
    /// A CI results API call failed.
    #[error(transparent)]
    Http(#[from] HttpClientError),

    /// Loading or submitting an action failed.
    #[error(transparent)]
    Taskcluster(#[from] TaskclusterError),

    /// The edited payload was rejected before submission.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// The decision-task lookup endpoint failed.
    #[error("Error getting Gecko Decision Task Ids: {0}")]
    DecisionTaskLookup(#[source] HttpClientError),

    /// The lookup answered but had no entry for this push.
    #[error("No decision task found for push {0}")]
    MissingDecisionTask(u64),

    /// No task id is known for this job.
    #[error("No task id found for job {0}")]
    MissingTaskId(u64),

    /// Remote commands need a logged in user.
    #[error("Must be logged in to {0}")]
    NotLoggedIn(&'static str),

    /// The job or session is not in a state that allows the command.
    #[error("{0}")]
    InvalidState(String),

    /// User supplied input is out of range.
    #[error("{0}")]
    InvalidInput(String),
}

impl JobsError {
    /// Whether this should be shown as a warning rather than a failure.
    pub fn is_warning(&self) -> bool {
        match self {
            Self::Taskcluster(e) => e.is_warning(),
            Self::InvalidState(_) => true,
            _ => false,
        }
    }

    /// HTTP status code, if the remote side answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) | Self::DecisionTaskLookup(e) => e.status_code(),
            Self::Taskcluster(e) => e.status_code(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_task_lookup_message() {
        let err = JobsError::DecisionTaskLookup(HttpClientError::Response {
            status: 500,
            message: "Internal Server Error".into(),
        });
        assert_eq!(
            err.to_string(),
            "Error getting Gecko Decision Task Ids: 500: Internal Server Error"
        );
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn test_not_logged_in_message() {
        assert_eq!(
            JobsError::NotLoggedIn("backfill a job").to_string(),
            "Must be logged in to backfill a job"
        );
    }

    #[test]
    fn test_warnings() {
        assert!(JobsError::InvalidState("Job not yet completed. Try again later.".into()).is_warning());
        assert!(JobsError::from(TaskclusterError::EmptyActionsManifest("x".into())).is_warning());
        assert!(!JobsError::MissingDecisionTask(1).is_warning());
    }
}

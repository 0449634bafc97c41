//! Task-execution service configuration.

use std::time::Duration;

/// Root URL of the production deployment.
pub const DEFAULT_ROOT_URL: &str = "https://firefox-ci-tc.services.mozilla.com";

/// Where the task-execution services live and how to authenticate.
#[derive(Debug, Clone)]
pub struct TaskclusterConfig {
    /// Deployment root, e.g. `https://firefox-ci-tc.services.mozilla.com`.
    pub root_url: String,

    /// Bearer credential sent with every request, if any.
    pub access_token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for TaskclusterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_URL)
    }
}

impl TaskclusterConfig {
    /// Configuration for the deployment at `root_url`.
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into().trim_end_matches('/').to_string(),
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the bearer credential.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the queue service, with a trailing slash.
    pub fn queue_url(&self) -> String {
        format!("{}/api/queue/v1/", self.root_url)
    }

    /// Base URL of the hooks service, with a trailing slash.
    pub fn hooks_url(&self) -> String {
        format!("{}/api/hooks/v1/", self.root_url)
    }

    /// Browser link to a task.
    pub fn task_url(&self, task_id: &str) -> String {
        format!("{}/tasks/{}", self.root_url, task_id)
    }
}

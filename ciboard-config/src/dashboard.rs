//! Typed configuration for the dashboard client.

use crate::{ConfigLoader, ConfigManager, ConfigValidator, Result, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `CIBOARD_REPO=try`.
pub const ENV_PREFIX: &str = "CIBOARD";

/// Settings shared by the accessor, the action workflow and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the CI results service; `/api` is appended for requests.
    pub treeherder_url: String,
    /// Root URL of the task-execution deployment.
    pub taskcluster_root_url: String,
    /// Repository (project) the commands operate on.
    pub repo: String,
    /// Repositories where backfilling is refused.
    pub try_repos: Vec<String>,
    /// Logged-in user; remote commands are refused without one.
    pub user_email: Option<String>,
    /// Bearer credential sent to the task-execution API.
    pub access_token: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            treeherder_url: "https://treeherder.mozilla.org".to_string(),
            taskcluster_root_url: "https://firefox-ci-tc.services.mozilla.com".to_string(),
            repo: "autoland".to_string(),
            try_repos: vec!["try".to_string()],
            user_email: None,
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_base_url(&self.treeherder_url, "treeherder_url")?;
        ConfigValidator::is_base_url(&self.taskcluster_root_url, "taskcluster_root_url")?;
        ConfigValidator::not_empty(&self.repo, "repo")?;
        ConfigValidator::in_range(self.timeout_secs, 1, 600, "timeout_secs")?;
        if let Some(email) = &self.user_email {
            ConfigValidator::is_email(email, "user_email")?;
        }
        Ok(())
    }
}

impl DashboardConfig {
    /// Whether a user is logged in.
    pub fn is_logged_in(&self) -> bool {
        self.user_email.is_some()
    }

    /// Whether the configured repository refuses backfills.
    pub fn is_try_repo(&self) -> bool {
        self.try_repos.iter().any(|r| r == &self.repo)
    }

    /// Build the configuration from defaults, an optional file (format taken
    /// from its extension), `.env`, then `CIBOARD_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let manager = ConfigManager::with_prefix(ENV_PREFIX);
        manager.merge_value(
            serde_json::to_value(Self::default())
                .map_err(|e| crate::ConfigError::SerializationError(e.to_string()))?,
        );

        if let Some(path) = path {
            let data = ConfigLoader::auto(path)?.load_file(path)?;
            manager.merge_value(data);
        }

        manager.load_dotenv(None)?;
        manager.load_validated()
    }
}

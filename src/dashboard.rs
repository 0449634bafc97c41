//! Wiring from a [`DashboardConfig`] to ready-to-use models.

use ciboard_config::DashboardConfig;
use ciboard_http::{HttpClient, HttpClientConfig};
use ciboard_jobs::{ActionBar, DecisionTaskCache, JobModel, JobsError, User};
use ciboard_taskcluster::{TaskclusterConfig, TaskclusterModel};
use std::time::Duration;

/// Models for one configured deployment, sharing a decision-task cache.
#[derive(Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    cache: DecisionTaskCache,
    http: HttpClient,
    jobs: JobModel,
}

impl Dashboard {
    /// Build the HTTP clients described by `config`.
    pub fn new(config: DashboardConfig) -> Result<Self, JobsError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = HttpClient::new(
            HttpClientConfig::builder()
                .base_url(format!("{}/api/", config.treeherder_url.trim_end_matches('/')))
                .timeout(timeout)
                .build(),
        )?;

        let mut taskcluster =
            TaskclusterConfig::new(&config.taskcluster_root_url).with_timeout(timeout);
        if let Some(token) = &config.access_token {
            taskcluster = taskcluster.with_access_token(token);
        }
        let taskcluster = TaskclusterModel::new(taskcluster)?;

        let cache = DecisionTaskCache::new();
        Ok(Self {
            jobs: JobModel::new(http.clone(), taskcluster, cache.clone()),
            http,
            cache,
            config,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn jobs(&self) -> &JobModel {
        &self.jobs
    }

    /// Performance comparisons against the configured CI results API.
    #[cfg(feature = "perf")]
    pub fn perf(&self) -> ciboard_perf::PerfModel {
        ciboard_perf::PerfModel::new(self.http.clone())
    }

    /// Cache shared by every model of this dashboard.
    pub fn cache(&self) -> &DecisionTaskCache {
        &self.cache
    }

    /// The configured user, logged in when an email is set.
    pub fn user(&self) -> User {
        self.config
            .user_email
            .as_ref()
            .map(User::logged_in)
            .unwrap_or_default()
    }

    /// Job commands for the configured repository and user.
    pub fn action_bar(&self) -> ActionBar {
        ActionBar::new(
            self.jobs.clone(),
            self.config.repo.clone(),
            self.config.is_try_repo(),
            self.user(),
        )
    }
}

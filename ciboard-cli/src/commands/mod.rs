//! CLI command implementations.

pub mod actions;
pub mod jobs;
pub mod perf;

use ciboard_config::DashboardConfig;
use ciboard_http::{HttpClient, HttpClientConfig};
use ciboard_jobs::{
    ActionBar, DecisionTaskCache, Job, JobFilter, JobModel, ListOptions, PushId, User,
};
use ciboard_perf::PerfModel;
use ciboard_taskcluster::{TaskclusterConfig, TaskclusterModel};
use std::time::Duration;

use crate::error::{CliError, CliResult};
use crate::output::ConsoleNotifier;

/// Everything a command needs, built once from the configuration.
pub struct Context {
    pub config: DashboardConfig,
    pub jobs: JobModel,
    pub perf: PerfModel,
    pub notifier: ConsoleNotifier,
}

impl Context {
    pub fn new(config: DashboardConfig, quiet: bool) -> CliResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let http = HttpClient::new(
            HttpClientConfig::builder()
                .base_url(api_root(&config.treeherder_url))
                .timeout(timeout)
                .user_agent(concat!("ciboard-cli/", env!("CARGO_PKG_VERSION")))
                .build(),
        )?;

        let mut taskcluster = TaskclusterConfig::new(&config.taskcluster_root_url).with_timeout(timeout);
        if let Some(token) = &config.access_token {
            taskcluster = taskcluster.with_access_token(token);
        }
        let taskcluster = TaskclusterModel::new(taskcluster)?;

        Ok(Self {
            perf: PerfModel::new(http.clone()),
            jobs: JobModel::new(http, taskcluster, DecisionTaskCache::new()),
            notifier: ConsoleNotifier::new(quiet),
            config,
        })
    }

    pub fn user(&self) -> User {
        match &self.config.user_email {
            Some(email) => User::logged_in(email),
            None => User::anonymous(),
        }
    }

    pub fn action_bar(&self) -> ActionBar {
        ActionBar::new(
            self.jobs.clone(),
            self.config.repo.clone(),
            self.config.is_try_repo(),
            self.user(),
        )
    }

    /// Jobs of `push_id` with the given ids, in the order asked for.
    pub async fn select_jobs(&self, push_id: PushId, job_ids: &[u64]) -> CliResult<Vec<Job>> {
        let list = self
            .jobs
            .get_list(&JobFilter::new().push_id(push_id), &ListOptions::all_pages())
            .await
            .map_err(|e| CliError::Client(e.to_string()))?;

        job_ids
            .iter()
            .map(|id| {
                list.data
                    .iter()
                    .find(|job| job.id == *id)
                    .cloned()
                    .ok_or_else(|| {
                        CliError::InvalidArgument(format!("job {id} is not part of push {push_id}"))
                    })
            })
            .collect()
    }

    pub async fn select_job(&self, push_id: PushId, job_id: u64) -> CliResult<Job> {
        let mut jobs = self.select_jobs(push_id, &[job_id]).await?;
        jobs.pop()
            .ok_or_else(|| CliError::InvalidArgument(format!("job {job_id} not found")))
    }
}

/// `https://host` becomes `https://host/api/`.
fn api_root(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/api") {
        format!("{base}/")
    } else {
        format!("{base}/api/")
    }
}

/// Turn a batch of outcomes into a CLI result. Every failure was already
/// printed by the notifier.
pub fn batch_result<T, E>(outcomes: &[Result<T, E>]) -> CliResult<()> {
    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::Partial {
            failed,
            total: outcomes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_root() {
        assert_eq!(api_root("https://treeherder.mozilla.org"), "https://treeherder.mozilla.org/api/");
        assert_eq!(api_root("https://treeherder.mozilla.org/"), "https://treeherder.mozilla.org/api/");
        assert_eq!(api_root("http://localhost:8000/api"), "http://localhost:8000/api/");
    }

    #[test]
    fn test_batch_result() {
        let ok: Vec<Result<(), ()>> = vec![Ok(()), Ok(())];
        assert!(batch_result(&ok).is_ok());

        let mixed: Vec<Result<(), ()>> = vec![Ok(()), Err(())];
        assert!(matches!(
            batch_result(&mixed),
            Err(CliError::Partial { failed: 1, total: 2 })
        ));
    }

    #[test]
    fn test_user_from_config() {
        let config = DashboardConfig {
            user_email: Some("sheriff@example.com".into()),
            ..Default::default()
        };
        let ctx = Context::new(config, true).unwrap();
        assert!(ctx.user().logged_in);

        let ctx = Context::new(DashboardConfig::default(), true).unwrap();
        assert!(!ctx.user().logged_in);
    }
}

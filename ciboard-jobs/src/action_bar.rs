//! Commands offered for a selected job.

use ciboard_taskcluster::{SubmissionRequest, format_taskcluster_error};
use serde_json::{Value, json};
use std::ops::RangeInclusive;

use crate::{
    CustomActionSession, DecisionTaskMap, Job, JobModel, JobState, JobsError, Notifier,
    NotifyOptions, PushId, Result, Severity,
};

/// Accepted `times` for test isolation.
pub const ISOLATION_TIMES: RangeInclusive<u32> = 1..=100;

/// The person using the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub email: Option<String>,
    pub logged_in: bool,
}

impl User {
    pub fn logged_in(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            logged_in: true,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Job commands for one repository and user.
///
/// Every command needs a logged in user. Failures are reported to the
/// notifier as well as returned.
#[derive(Clone)]
pub struct ActionBar {
    jobs: JobModel,
    repo: String,
    try_repo: bool,
    user: User,
}

impl ActionBar {
    pub fn new(jobs: JobModel, repo: impl Into<String>, try_repo: bool, user: User) -> Self {
        Self {
            jobs,
            repo: repo.into(),
            try_repo,
            user,
        }
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Backfill is refused on try repositories.
    pub fn can_backfill(&self) -> bool {
        self.user.logged_in && !self.try_repo
    }

    /// Retrigger each job `times` times.
    pub async fn retrigger(
        &self,
        jobs: &[Job],
        times: u32,
        notifier: &dyn Notifier,
        decision_task_map: Option<&DecisionTaskMap>,
    ) -> Result<Vec<Result<String>>> {
        self.require_login("retrigger a job", notifier)?;
        self.jobs
            .retrigger(jobs, &self.repo, notifier, times, decision_task_map)
            .await
    }

    /// Cancel the pending and running jobs among `jobs`.
    pub async fn cancel(
        &self,
        jobs: &[Job],
        notifier: &dyn Notifier,
        decision_task_map: Option<&DecisionTaskMap>,
    ) -> Result<Vec<Result<String>>> {
        self.require_login("cancel a job", notifier)?;
        let active: Vec<Job> = jobs.iter().filter(|job| job.state.is_active()).cloned().collect();
        if active.is_empty() {
            return Ok(Vec::new());
        }
        self.jobs
            .cancel(&active, &self.repo, notifier, decision_task_map)
            .await
    }

    /// Cancel every job of a push.
    pub async fn cancel_all(&self, push_id: PushId, notifier: &dyn Notifier) -> Result<String> {
        self.require_login("cancel all jobs", notifier)?;
        self.jobs.cancel_all(push_id, &self.repo, notifier, None).await
    }

    pub async fn backfill(&self, job: &Job, notifier: &dyn Notifier) -> Result<String> {
        self.require_login("backfill a job", notifier)?;
        if self.try_repo {
            return Err(report(
                notifier,
                JobsError::InvalidState("Backfill not available in this repository".into()),
            ));
        }
        self.run(
            job,
            "backfill",
            json!({}),
            "Request sent to backfill job via actions.json",
            notifier,
        )
        .await
    }

    /// Re-run a completed job's failing tests `times` times.
    pub async fn isolate(&self, job: &Job, times: u32, notifier: &dyn Notifier) -> Result<String> {
        self.require_login("isolate a job", notifier)?;
        if job.state != JobState::Completed {
            return Err(report(
                notifier,
                JobsError::InvalidState("Job not yet completed. Try again later.".into()),
            ));
        }
        if !ISOLATION_TIMES.contains(&times) {
            return Err(report(
                notifier,
                JobsError::InvalidInput(format!(
                    "Number of times to run isolation jobs must be between {} and {}",
                    ISOLATION_TIMES.start(),
                    ISOLATION_TIMES.end()
                )),
            ));
        }
        self.run(
            job,
            "isolate-test-failures",
            json!({ "times": times }),
            "Request sent to isolate-test-failures job via actions.json",
            notifier,
        )
        .await
    }

    pub async fn gecko_profile(&self, job: &Job, notifier: &dyn Notifier) -> Result<String> {
        self.require_login("create a gecko profile", notifier)?;
        self.run(
            job,
            "geckoprofile",
            json!({}),
            "Request sent to collect gecko profile job via actions.json",
            notifier,
        )
        .await
    }

    /// Start an interactive copy of the job; a link is mailed to the user.
    pub async fn create_interactive(&self, job: &Job, notifier: &dyn Notifier) -> Result<String> {
        self.require_login("create an interactive task", notifier)?;
        let Some(email) = self.user.email.clone() else {
            return Err(report(
                notifier,
                JobsError::InvalidInput("An email address is needed to create an interactive task".into()),
            ));
        };
        self.run(
            job,
            "create-interactive",
            json!({ "notify": email }),
            "Request sent to create an interactive job via actions.json. \
             You will soon receive an email containing a link to interact with the task.",
            notifier,
        )
        .await
    }

    /// Open a custom action session for a push, narrowed to `job` if given.
    pub async fn custom_action(
        &self,
        push_id: PushId,
        job: Option<&Job>,
        notifier: &dyn Notifier,
    ) -> Result<CustomActionSession> {
        self.require_login("trigger a custom action", notifier)?;
        let map = self
            .jobs
            .push_model()
            .decision_task_map(&self.repo, &[push_id], Some(notifier))
            .await?;
        if !map.contains_key(&push_id) {
            return Err(report(notifier, JobsError::MissingDecisionTask(push_id)));
        }

        let job = match job {
            Some(job) => Some(self.with_task_id(job).await.map_err(|e| report(notifier, e))?),
            None => None,
        };

        let mut session = CustomActionSession::new(self.jobs.taskcluster().clone());
        session.open(&map, push_id, job.as_ref(), notifier).await?;
        Ok(session)
    }

    fn require_login(&self, what: &'static str, notifier: &dyn Notifier) -> Result<()> {
        if self.user.logged_in {
            Ok(())
        } else {
            Err(report(notifier, JobsError::NotLoggedIn(what)))
        }
    }

    async fn with_task_id(&self, job: &Job) -> Result<Job> {
        if job.task_id.is_some() {
            return Ok(job.clone());
        }
        let task_id = self
            .jobs
            .task_ids(&[job.id])
            .await?
            .remove(&job.id)
            .ok_or(JobsError::MissingTaskId(job.id))?;
        Ok(job.clone().with_task_id(task_id))
    }

    /// Load the job's actions and submit `action_name` with `input`.
    async fn run(
        &self,
        job: &Job,
        action_name: &str,
        input: Value,
        success: &str,
        notifier: &dyn Notifier,
    ) -> Result<String> {
        let decision_task = self
            .jobs
            .push_model()
            .decision_task(&self.repo, job.push_id, Some(notifier))
            .await
            .map_err(|e| report(notifier, e))?;
        let job = self.with_task_id(job).await.map_err(|e| report(notifier, e))?;
        let task_id = job.task_id.as_deref().unwrap_or_default();

        match self
            .submit_action(&decision_task.id, task_id, action_name, input)
            .await
        {
            Ok(task_id) => {
                notifier.success(success);
                Ok(task_id)
            }
            Err(e) => Err(report(notifier, e.into())),
        }
    }

    async fn submit_action(
        &self,
        decision_task_id: &str,
        task_id: &str,
        action_name: &str,
        input: Value,
    ) -> ciboard_taskcluster::Result<String> {
        let taskcluster = self.jobs.taskcluster();
        let loaded = taskcluster.load(decision_task_id, Some(task_id)).await?;
        let action = loaded.get_action(action_name)?.clone();
        taskcluster
            .submit(SubmissionRequest::from_load(&loaded, action, decision_task_id, input))
            .await
    }
}

/// Send `err` to the notifier with the severity it warrants and hand it
/// back. Decision-task lookup failures were already reported at the source.
fn report(notifier: &dyn Notifier, err: JobsError) -> JobsError {
    match &err {
        JobsError::DecisionTaskLookup(_) => {}
        JobsError::NotLoggedIn(_) | JobsError::InvalidInput(_) => {
            notifier.notify(&err.to_string(), Severity::Danger, NotifyOptions::default());
        }
        e if e.is_warning() => {
            notifier.notify(&e.to_string(), Severity::Warning, NotifyOptions::sticky());
        }
        JobsError::Taskcluster(e) => notifier.danger(&format_taskcluster_error(e)),
        e => notifier.danger(&e.to_string()),
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotificationLog;
    use ciboard_http::HttpClient;
    use ciboard_taskcluster::{TaskclusterConfig, TaskclusterModel};

    fn bar(user: User, try_repo: bool) -> ActionBar {
        let http = HttpClient::with_base_url("http://127.0.0.1:9/api/").unwrap();
        let taskcluster = TaskclusterModel::new(TaskclusterConfig::new("http://127.0.0.1:9")).unwrap();
        let jobs = JobModel::new(http, taskcluster, Default::default());
        ActionBar::new(jobs, if try_repo { "try" } else { "autoland" }, try_repo, user)
    }

    #[tokio::test]
    async fn test_login_required() {
        let log = NotificationLog::new();
        let job = Job::new(1, 2, "test", JobState::Completed);
        let err = bar(User::anonymous(), false).backfill(&job, &log).await.unwrap_err();

        assert!(matches!(err, JobsError::NotLoggedIn("backfill a job")));
        assert_eq!(log.messages(), vec!["Must be logged in to backfill a job"]);
        assert_eq!(log.entries()[0].severity, Severity::Danger);
    }

    #[tokio::test]
    async fn test_backfill_refused_on_try() {
        let log = NotificationLog::new();
        let bar = bar(User::logged_in("me@example.com"), true);
        assert!(!bar.can_backfill());

        let job = Job::new(1, 2, "test", JobState::Completed);
        let err = bar.backfill(&job, &log).await.unwrap_err();
        assert!(matches!(err, JobsError::InvalidState(_)));
        assert_eq!(log.entries()[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_isolate_preconditions() {
        let log = NotificationLog::new();
        let bar = bar(User::logged_in("me@example.com"), false);

        let running = Job::new(1, 2, "test", JobState::Running);
        let err = bar.isolate(&running, 5, &log).await.unwrap_err();
        assert_eq!(err.to_string(), "Job not yet completed. Try again later.");

        let done = Job::new(1, 2, "test", JobState::Completed);
        for times in [0, 101] {
            let err = bar.isolate(&done, times, &log).await.unwrap_err();
            assert!(matches!(err, JobsError::InvalidInput(_)));
        }
        assert_eq!(log.entries().len(), 3);
    }

    #[tokio::test]
    async fn test_cancel_with_no_active_jobs_does_nothing() {
        let log = NotificationLog::new();
        let bar = bar(User::logged_in("me@example.com"), false);
        let jobs = vec![Job::new(1, 2, "test", JobState::Completed)];

        let outcomes = bar.cancel(&jobs, &log, None).await.unwrap();
        assert!(outcomes.is_empty());
        assert!(log.entries().is_empty());
    }
}

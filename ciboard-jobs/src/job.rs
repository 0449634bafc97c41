//! Job model: paginated listing and batch actions.

use ciboard_http::HttpClient;
use ciboard_taskcluster::{
    Action, ActionsLoad, SubmissionRequest, TaskclusterError, TaskclusterModel,
    format_taskcluster_error,
};
use futures::future;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::models::TaskMetadata;
use crate::{
    DecisionTaskCache, DecisionTaskMap, DecisionTaskRef, Job, JobList, JobsError, Notifier,
    PageEnvelope, PushId, PushModel, Result,
};

/// Query parameters for a job listing, in the order they are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    params: Vec<(String, String)>,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn push_id(self, push_id: PushId) -> Self {
        self.param("push_id", push_id)
    }

    pub fn count(self, count: usize) -> Self {
        self.param("count", count)
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// How [`JobModel::get_list`] fetches.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Follow next links and concatenate every page.
    pub fetch_all: bool,

    /// Alternate endpoint with the same envelope, relative to the API root or
    /// absolute. Defaults to `jobs/`.
    pub uri: Option<String>,
}

impl ListOptions {
    pub fn all_pages() -> Self {
        Self {
            fetch_all: true,
            uri: None,
        }
    }
}

/// Job access and batch commands against the CI results API.
#[derive(Clone)]
pub struct JobModel {
    http: HttpClient,
    push: PushModel,
    taskcluster: TaskclusterModel,
}

impl JobModel {
    /// `http` must be rooted at the CI results API (`.../api/`).
    pub fn new(http: HttpClient, taskcluster: TaskclusterModel, cache: DecisionTaskCache) -> Self {
        Self {
            push: PushModel::new(http.clone(), cache),
            http,
            taskcluster,
        }
    }

    pub fn push_model(&self) -> &PushModel {
        &self.push
    }

    pub fn taskcluster(&self) -> &TaskclusterModel {
        &self.taskcluster
    }

    /// List jobs matching `filter`.
    ///
    /// Only the first page is returned unless `options.fetch_all` is set, in
    /// which case next links are followed (re-sending the original filters
    /// with the next page number) and pages are concatenated in order. Any
    /// failed page fails the whole call.
    pub async fn get_list(&self, filter: &JobFilter, options: &ListOptions) -> Result<JobList> {
        let endpoint = options.uri.as_deref().unwrap_or("jobs/");
        let mut data = Vec::new();
        let mut page: Option<String> = None;
        let mut verbatim: Option<String> = None;

        loop {
            let request = match verbatim.take() {
                Some(url) => self.http.get(url),
                None => {
                    let params = filter
                        .params()
                        .iter()
                        .filter(|(key, _)| page.is_none() || key != "page")
                        .cloned();
                    let request = self.http.get(endpoint).queries(params);
                    match &page {
                        Some(page) => request.query("page", page.clone()),
                        None => request,
                    }
                }
            };

            let envelope: PageEnvelope = request.send().await?.error_for_status()?.json()?;
            let next = envelope.next_url().map(String::from);
            let jobs = envelope.into_jobs()?;
            debug!(count = jobs.len(), page = ?page, "Fetched job page");
            data.extend(jobs);

            match next {
                Some(next) if options.fetch_all => match page_param(&next) {
                    Some(next_page) => page = Some(next_page),
                    None => verbatim = Some(next),
                },
                _ => break,
            }
        }

        Ok(JobList { data })
    }

    /// Task ids for jobs, from `taskclustermetadata/`.
    pub async fn task_ids(&self, job_ids: &[u64]) -> Result<HashMap<u64, String>> {
        if job_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids = job_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let metadata: HashMap<String, TaskMetadata> = self
            .http
            .get("taskclustermetadata/")
            .query("job_ids", ids)
            .send()
            .await?
            .error_for_status()?
            .json()?;

        Ok(metadata
            .into_iter()
            .filter_map(|(job_id, meta)| Some((job_id.parse().ok()?, meta.task_id)))
            .collect())
    }

    /// Retrigger (or add) each job through its push's actions.
    ///
    /// Actions are loaded once per push, without a task. Every job is one
    /// submission, using `retrigger-multiple` when offered and
    /// `add-new-jobs` otherwise. Submissions run concurrently; each outcome
    /// is notified and returned. A push whose actions cannot be loaded
    /// contributes one error. Fails outright only if decision tasks cannot
    /// be resolved.
    pub async fn retrigger(
        &self,
        jobs: &[Job],
        repo: &str,
        notifier: &dyn Notifier,
        times: u32,
        decision_task_map: Option<&DecisionTaskMap>,
    ) -> Result<Vec<Result<String>>> {
        let term = job_term(jobs.len());
        notifier.info(&format!("Attempting to retrigger/add {term} via actions.json"));

        let push_ids = distinct_push_ids(jobs);
        let map = self
            .resolve(repo, &push_ids, notifier, decision_task_map)
            .await?;

        let per_push = push_ids.iter().map(|&push_id| {
            let push_jobs: Vec<&Job> = jobs.iter().filter(|job| job.push_id == push_id).collect();
            let decision_task = map.get(&push_id).cloned();
            async move {
                self.retrigger_push(push_id, decision_task, push_jobs, times, notifier, term)
                    .await
            }
        });

        Ok(future::join_all(per_push)
            .await
            .into_iter()
            .flatten()
            .collect())
    }

    async fn retrigger_push(
        &self,
        push_id: PushId,
        decision_task: Option<DecisionTaskRef>,
        jobs: Vec<&Job>,
        times: u32,
        notifier: &dyn Notifier,
        term: &str,
    ) -> Vec<Result<String>> {
        let failed = |err: JobsError| {
            notifier.danger(&format!("Unable to retrigger/add {term}.  {}", describe(&err)));
            vec![Err(err)]
        };

        let Some(decision_task) = decision_task else {
            return failed(JobsError::MissingDecisionTask(push_id));
        };
        let loaded = match self.taskcluster.load(&decision_task.id, None).await {
            Ok(loaded) => loaded,
            Err(e) => return failed(e.into()),
        };
        let (action, multiple) = match retrigger_action(&loaded) {
            Ok(found) => found,
            Err(e) => return failed(e.into()),
        };

        let submissions = jobs.into_iter().map(|job| {
            let input = if multiple {
                json!({"requests": [{"tasks": [job.job_type_name], "times": times}]})
            } else {
                json!({"tasks": [job.job_type_name], "times": times})
            };
            let request = SubmissionRequest::new(action.clone(), decision_task.id.clone(), input)
                .static_variables(loaded.static_action_variables.clone());
            let action_task_id = request.action_task_id.clone();

            async move {
                match self.taskcluster.submit(request).await {
                    Ok(task_id) => {
                        notifier.success(&format!(
                            "Request sent to retrigger/add new jobs via actions.json ({action_task_id})"
                        ));
                        Ok(task_id)
                    }
                    Err(e) => {
                        warn!(job_id = job.id, error = %e, "Retrigger failed");
                        notifier.danger(&format!(
                            "Unable to retrigger/add {term}.  {}",
                            format_taskcluster_error(&e)
                        ));
                        Err(e.into())
                    }
                }
            }
        });

        future::join_all(submissions).await
    }

    /// Cancel each job's task through the `cancel` action.
    ///
    /// Jobs without a task id get one from the metadata endpoint first.
    /// Each distinct task is loaded with its definition and cancelled
    /// concurrently; outcomes are notified and returned per task.
    pub async fn cancel(
        &self,
        jobs: &[Job],
        repo: &str,
        notifier: &dyn Notifier,
        decision_task_map: Option<&DecisionTaskMap>,
    ) -> Result<Vec<Result<String>>> {
        let term = job_term(jobs.len());

        let unknown: Vec<u64> = jobs
            .iter()
            .filter(|job| job.task_id.is_none())
            .map(|job| job.id)
            .collect();
        let looked_up = match self.task_ids(&unknown).await {
            Ok(looked_up) => looked_up,
            Err(e) => {
                notifier.danger(&format!("Unable to cancel {term}: {e}"));
                return Err(e);
            }
        };

        let push_ids = distinct_push_ids(jobs);
        let map = self
            .resolve(repo, &push_ids, notifier, decision_task_map)
            .await?;

        let mut seen = HashSet::new();
        let mut outcomes = Vec::new();
        let mut targets = Vec::new();
        for job in jobs {
            let task_id = job.task_id.clone().or_else(|| looked_up.get(&job.id).cloned());
            match task_id {
                Some(task_id) => {
                    if seen.insert(task_id.clone()) {
                        targets.push((job, task_id));
                    }
                }
                None => {
                    let err = JobsError::MissingTaskId(job.id);
                    notifier.danger(&format!("Unable to cancel {term}: {err}"));
                    outcomes.push(Err(err));
                }
            }
        }

        let cancels = targets.into_iter().map(|(job, task_id)| {
            let decision_task = map.get(&job.push_id).cloned();
            async move {
                let result = match decision_task {
                    Some(decision_task) => self
                        .cancel_task(&decision_task.id, &task_id)
                        .await
                        .map_err(JobsError::from),
                    None => Err(JobsError::MissingDecisionTask(job.push_id)),
                };
                match &result {
                    Ok(_) => notifier.success(&format!("Request sent to cancel {term} via action.json")),
                    Err(e) => {
                        warn!(job_id = job.id, task_id = %task_id, error = %e, "Cancel failed");
                        notifier.danger(&format!("Unable to cancel {term}: {}", describe(e)));
                    }
                }
                result
            }
        });

        outcomes.extend(future::join_all(cancels).await);
        Ok(outcomes)
    }

    async fn cancel_task(&self, decision_task_id: &str, task_id: &str) -> ciboard_taskcluster::Result<String> {
        let loaded = self.taskcluster.load(decision_task_id, Some(task_id)).await?;
        let action = loaded.get_action("cancel")?.clone();
        self.taskcluster
            .submit(SubmissionRequest::from_load(&loaded, action, decision_task_id, json!({})))
            .await
    }

    /// Cancel every job of a push through the `cancel-all` action.
    pub async fn cancel_all(
        &self,
        push_id: PushId,
        repo: &str,
        notifier: &dyn Notifier,
        decision_task: Option<&DecisionTaskRef>,
    ) -> Result<String> {
        let decision_task = match decision_task {
            Some(decision_task) => decision_task.clone(),
            None => match self.push.decision_task(repo, push_id, Some(notifier)).await {
                Ok(decision_task) => decision_task,
                Err(e @ JobsError::MissingDecisionTask(_)) => {
                    notifier.danger(&format!("Unable to cancel all jobs: {e}"));
                    return Err(e);
                }
                Err(e) => return Err(e),
            },
        };

        match self.cancel_all_task(&decision_task.id).await {
            Ok(task_id) => {
                notifier.success("Request sent to cancel all jobs via action.json");
                Ok(task_id)
            }
            Err(e) => {
                warn!(push_id, error = %e, "Cancel all failed");
                notifier.danger(&format!(
                    "Unable to cancel all jobs: {}",
                    format_taskcluster_error(&e)
                ));
                Err(e.into())
            }
        }
    }

    async fn cancel_all_task(&self, decision_task_id: &str) -> ciboard_taskcluster::Result<String> {
        let loaded = self.taskcluster.load(decision_task_id, None).await?;
        let action = loaded.get_action("cancel-all")?.clone();
        self.taskcluster
            .submit(SubmissionRequest::from_load(&loaded, action, decision_task_id, json!({})))
            .await
    }

    /// Use the supplied map, or resolve through the push model.
    async fn resolve(
        &self,
        repo: &str,
        push_ids: &[PushId],
        notifier: &dyn Notifier,
        supplied: Option<&DecisionTaskMap>,
    ) -> Result<DecisionTaskMap> {
        match supplied {
            Some(map) => Ok(map.clone()),
            None => self.push.decision_task_map(repo, push_ids, Some(notifier)).await,
        }
    }
}

fn job_term(count: usize) -> &'static str {
    if count > 1 { "jobs" } else { "job" }
}

fn distinct_push_ids(jobs: &[Job]) -> Vec<PushId> {
    let mut push_ids = Vec::new();
    for job in jobs {
        if !push_ids.contains(&job.push_id) {
            push_ids.push(job.push_id);
        }
    }
    push_ids
}

/// `retrigger-multiple` if offered, else `add-new-jobs`. The flag tells
/// which input shape to use.
fn retrigger_action(loaded: &ActionsLoad) -> std::result::Result<(Action, bool), TaskclusterError> {
    match loaded.get_action("retrigger-multiple") {
        Ok(action) => Ok((action.clone(), true)),
        Err(_) => Ok((loaded.get_action("add-new-jobs")?.clone(), false)),
    }
}

/// Remote failures get the task-execution prefix; local ones read as-is.
fn describe(err: &JobsError) -> String {
    match err {
        JobsError::Taskcluster(e) => format_taskcluster_error(e),
        other => other.to_string(),
    }
}

fn page_param(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url)
        .or_else(|_| url::Url::parse("http://localhost/").and_then(|base| base.join(url)))
        .ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())
}

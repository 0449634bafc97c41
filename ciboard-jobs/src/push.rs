//! Push model: decision-task resolution.

use ciboard_http::HttpClient;
use std::collections::HashMap;
use tracing::debug;

use crate::{
    DecisionTaskCache, DecisionTaskMap, DecisionTaskRef, JobsError, Notifier, PushId, Result,
};

/// Resolves decision tasks for pushes against the CI results API, through a
/// [`DecisionTaskCache`].
#[derive(Clone)]
pub struct PushModel {
    http: HttpClient,
    cache: DecisionTaskCache,
}

impl PushModel {
    /// `http` must be rooted at the CI results API (`.../api/`).
    pub fn new(http: HttpClient, cache: DecisionTaskCache) -> Self {
        Self { http, cache }
    }

    pub fn cache(&self) -> &DecisionTaskCache {
        &self.cache
    }

    /// Decision tasks for `push_ids`.
    ///
    /// Cached ids cost nothing; the rest are fetched in a single request and
    /// cached. Pushes the server has no decision task for are left out of the
    /// returned map. On failure the error is also sent to `notifier`.
    pub async fn decision_task_map(
        &self,
        repo: &str,
        push_ids: &[PushId],
        notifier: Option<&dyn Notifier>,
    ) -> Result<DecisionTaskMap> {
        let (mut found, missing) = self.cache.partition(push_ids);
        if missing.is_empty() {
            return Ok(found);
        }

        let ids = missing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        debug!(repo, push_ids = %ids, "Resolving decision tasks");

        let fetched = self
            .http
            .get(format!("project/{repo}/push/decisiontask/"))
            .query("push_ids", ids)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<HashMap<String, DecisionTaskRef>>());

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                let err = JobsError::DecisionTaskLookup(e);
                if let Some(notifier) = notifier {
                    notifier.danger(&err.to_string());
                }
                return Err(err);
            }
        };

        for (push_id, decision_task) in fetched {
            let Ok(push_id) = push_id.parse::<PushId>() else {
                continue;
            };
            self.cache.insert(push_id, decision_task.clone());
            found.insert(push_id, decision_task);
        }

        Ok(found)
    }

    /// Decision task for a single push.
    pub async fn decision_task(
        &self,
        repo: &str,
        push_id: PushId,
        notifier: Option<&dyn Notifier>,
    ) -> Result<DecisionTaskRef> {
        self.decision_task_map(repo, &[push_id], notifier)
            .await?
            .remove(&push_id)
            .ok_or(JobsError::MissingDecisionTask(push_id))
    }
}

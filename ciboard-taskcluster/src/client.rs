//! Queue and hooks client: loading actions and submitting them.

use ciboard_http::{AuthInterceptor, HttpClient, HttpClientConfig, LoggingInterceptor};
use futures::future;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::StatusResponse;
use crate::template::render;
use crate::{
    ActionKind, ActionsLoad, ActionsManifest, Result, SubmissionRequest, TaskclusterConfig,
    TaskclusterError,
};

/// Client for the task-execution queue and hooks services.
#[derive(Clone)]
pub struct TaskclusterModel {
    config: Arc<TaskclusterConfig>,
    queue: HttpClient,
    hooks: HttpClient,
}

impl TaskclusterModel {
    /// Create clients for the deployment described by `config`.
    pub fn new(config: TaskclusterConfig) -> Result<Self> {
        let queue = service_client(&config, config.queue_url())?;
        let hooks = service_client(&config, config.hooks_url())?;
        Ok(Self {
            config: Arc::new(config),
            queue,
            hooks,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &TaskclusterConfig {
        &self.config
    }

    /// Fetch a task definition.
    pub async fn task_definition(&self, task_id: &str) -> Result<Value> {
        Ok(self.queue.get_json(format!("task/{task_id}")).await?)
    }

    /// Fetch the `public/actions.json` artifact of a decision task.
    pub async fn actions_manifest(&self, decision_task_id: &str) -> Result<ActionsManifest> {
        let value: Value = self
            .queue
            .get_json(format!(
                "task/{decision_task_id}/artifacts/public%2Factions.json"
            ))
            .await?;
        serde_json::from_value(value).map_err(|e| TaskclusterError::InvalidManifest(e.to_string()))
    }

    /// Load the actions usable against `decision_task_id`.
    ///
    /// With `task_id`, its definition is fetched alongside the manifest and
    /// only actions whose context matches the task's tags are kept. Without
    /// it, only push-wide actions (empty context) are kept.
    pub async fn load(&self, decision_task_id: &str, task_id: Option<&str>) -> Result<ActionsLoad> {
        debug!(decision_task_id, task_id, "Loading actions");

        let original = async {
            match task_id {
                Some(id) => self.task_definition(id).await.map(Some),
                None => Ok(None),
            }
        };
        let (manifest, original_task) =
            future::try_join(self.actions_manifest(decision_task_id), original).await?;

        if manifest.version != 1 {
            return Err(TaskclusterError::UnsupportedManifestVersion(manifest.version));
        }

        let empty = Map::new();
        let tags = original_task
            .as_ref()
            .map(|task| task.get("tags").and_then(Value::as_object).unwrap_or(&empty));

        let actions: Vec<_> = manifest
            .actions
            .into_iter()
            .filter(|action| matches!(action.kind, ActionKind::Task | ActionKind::Hook))
            .filter(|action| match tags {
                Some(tags) => action.matches_tags(tags),
                None => action.context.is_empty(),
            })
            .collect();

        if actions.is_empty() {
            return Err(TaskclusterError::EmptyActionsManifest(
                decision_task_id.to_string(),
            ));
        }

        debug!(decision_task_id, count = actions.len(), "Actions loaded");

        Ok(ActionsLoad {
            original_task,
            original_task_id: task_id.map(String::from),
            static_action_variables: manifest.variables,
            actions,
        })
    }

    /// Render and submit an action. Returns the id of the task that was
    /// created (or that the hook created).
    pub async fn submit(&self, request: SubmissionRequest) -> Result<String> {
        let mut context = request.render_context();
        let action = &request.action;

        let response = match action.kind {
            ActionKind::Hook => {
                let (Some(group), Some(hook)) = (&action.hook_group_id, &action.hook_id) else {
                    return Err(TaskclusterError::Template(format!(
                        "hook action {} has no hookGroupId/hookId",
                        action.name
                    )));
                };
                let template = action.hook_payload.clone().unwrap_or(Value::Object(Map::new()));
                let payload = render(&template, &context)?;
                self.hooks
                    .post(format!(
                        "hooks/{}/{}/trigger",
                        encode_segment(group),
                        encode_segment(hook)
                    ))
                    .json(&payload)
                    .send()
                    .await
            }
            ActionKind::Task => {
                context.insert("task".to_string(), request.task.clone().unwrap_or(Value::Null));
                context.insert(
                    "ownTaskId".to_string(),
                    Value::String(request.action_task_id.clone()),
                );
                let template = action.task.as_ref().ok_or_else(|| {
                    TaskclusterError::Template(format!("task action {} has no task template", action.name))
                })?;
                let task = render(template, &context)?;
                self.queue
                    .put(format!("task/{}", request.action_task_id))
                    .json(&task)
                    .send()
                    .await
            }
            ActionKind::Unknown => {
                return Err(TaskclusterError::UnsupportedActionKind(action.kind.to_string()));
            }
        };

        let status: StatusResponse = match response.and_then(|r| r.error_for_status()) {
            Ok(response) => response.json()?,
            Err(e) => {
                let err = TaskclusterError::remote(e);
                warn!(action = %action.name, error = %err, "Action submission failed");
                return Err(err);
            }
        };

        info!(action = %action.name, task_id = %status.status.task_id, "Action submitted");
        Ok(status.status.task_id)
    }
}

fn service_client(config: &TaskclusterConfig, base_url: String) -> Result<HttpClient> {
    let http = HttpClient::new(
        HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(config.timeout)
            .build(),
    )?
    .with_interceptor(LoggingInterceptor::new());

    Ok(match &config.access_token {
        Some(token) => http.with_interceptor(AuthInterceptor::bearer(token)?),
        None => http,
    })
}

/// Percent-encode a single path segment (hook ids contain `/`).
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

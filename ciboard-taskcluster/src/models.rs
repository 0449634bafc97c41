//! Actions manifest and submission types.

use crate::slugid::slugid;
use crate::{Result, TaskclusterError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// How an action is carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Create a task directly from the rendered `task` template.
    Task,
    /// Fire a hook with the rendered `hookPayload`.
    Hook,
    /// Anything else, or no kind at all; never offered to the user.
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Task => "task",
            Self::Hook => "hook",
            Self::Unknown => "unknown",
        })
    }
}

/// One entry of the actions manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub name: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub kind: ActionKind,

    /// JSON Schema for the action input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,

    /// Tag sets the action applies to. Empty means the push as a whole.
    #[serde(default)]
    pub context: Vec<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_group_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_payload: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Action {
    /// Whether this action applies to a task carrying `tags`.
    ///
    /// Some context entry must have every key present in `tags` with an
    /// equal value.
    pub fn matches_tags(&self, tags: &Map<String, Value>) -> bool {
        self.context
            .iter()
            .any(|entry| entry.iter().all(|(key, value)| tags.get(key) == Some(value)))
    }
}

/// The `public/actions.json` artifact of a decision task.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionsManifest {
    pub version: u64,

    #[serde(default)]
    pub variables: Map<String, Value>,

    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Actions usable against a decision task, optionally narrowed to one task.
#[derive(Debug, Clone, Default)]
pub struct ActionsLoad {
    pub original_task: Option<Value>,
    pub original_task_id: Option<String>,
    pub static_action_variables: Map<String, Value>,
    pub actions: Vec<Action>,
}

impl ActionsLoad {
    /// Look an action up by name.
    pub fn get_action(&self, name: &str) -> Result<&Action> {
        self.actions
            .iter()
            .find(|action| action.name == name)
            .ok_or_else(|| TaskclusterError::ActionNotAvailable {
                name: name.to_string(),
                available: self.action_names().join(", "),
            })
    }

    /// Whether an action of this name was loaded.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.iter().any(|action| action.name == name)
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|action| action.name.as_str()).collect()
    }
}

/// Everything needed to submit one action invocation.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub action: Action,
    /// Id the created task will get (task actions only).
    pub action_task_id: String,
    pub decision_task_id: String,
    /// Task the action runs against, if any.
    pub task_id: Option<String>,
    /// Definition of `task_id`.
    pub task: Option<Value>,
    pub input: Value,
    pub static_action_variables: Map<String, Value>,
}

impl SubmissionRequest {
    /// Request for `action` in the task group of `decision_task_id`, with a
    /// freshly generated action task id.
    pub fn new(action: Action, decision_task_id: impl Into<String>, input: Value) -> Self {
        Self {
            action,
            action_task_id: slugid(),
            decision_task_id: decision_task_id.into(),
            task_id: None,
            task: None,
            input,
            static_action_variables: Map::new(),
        }
    }

    /// Build a request against whatever `load` returned.
    pub fn from_load(
        loaded: &ActionsLoad,
        action: Action,
        decision_task_id: impl Into<String>,
        input: Value,
    ) -> Self {
        let mut request = Self::new(action, decision_task_id, input)
            .static_variables(loaded.static_action_variables.clone());
        request.task_id = loaded.original_task_id.clone();
        request.task = loaded.original_task.clone();
        request
    }

    /// Target a specific task.
    pub fn for_task(mut self, task_id: impl Into<String>, task: Option<Value>) -> Self {
        self.task_id = Some(task_id.into());
        self.task = task;
        self
    }

    pub fn static_variables(mut self, variables: Map<String, Value>) -> Self {
        self.static_action_variables = variables;
        self
    }

    /// Template context shared by hook and task actions.
    pub fn render_context(&self) -> Map<String, Value> {
        let mut context = Map::new();
        context.insert(
            "taskGroupId".to_string(),
            Value::String(self.decision_task_id.clone()),
        );
        context.insert(
            "taskId".to_string(),
            self.task_id.clone().map(Value::String).unwrap_or(Value::Null),
        );
        context.insert("input".to_string(), self.input.clone());
        for (key, value) in &self.static_action_variables {
            context.insert(key.clone(), value.clone());
        }
        context
    }
}

/// `{"status": {"taskId": ...}}` as returned by task creation and hook
/// triggering.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskStatus {
    pub task_id: String,
}

//! Interactive custom-action session.
//!
//! Mirrors the "custom action" dialog: load the actions for a push (and
//! optionally one job), pick an action, edit its YAML payload and trigger it.
//! A session handles one request at a time; `trigger` takes `&mut self`, so a
//! superseded load or submission can never write into a newer state.

use ciboard_taskcluster::{
    Action, ActionsLoad, SubmissionRequest, TaskclusterModel, format_taskcluster_error,
};
use ciboard_validation::{
    PayloadError, SchemaValidator, Validator, parse_payload, schema_defaults, to_yaml,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{DecisionTaskMap, Job, JobsError, Notifier, NotifyOptions, PushId, Result, Severity};

/// Actions whose result is an interactive loaner rather than a plain task.
pub const LOANER_ACTIONS: &[&str] = &["docker-worker-linux-loaner", "generic-worker-windows-loaner"];

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Validating,
    Submitting,
    Succeeded(String),
    Failed(String),
}

/// Custom action dialog state for one push.
pub struct CustomActionSession {
    taskcluster: TaskclusterModel,
    decision_task_id: Option<String>,
    loaded: Option<ActionsLoad>,
    selected: Option<usize>,
    schema: Option<String>,
    payload: Option<String>,
    validator: Option<Box<dyn Validator>>,
    triggering: bool,
    state: SessionState,
}

impl CustomActionSession {
    pub fn new(taskcluster: TaskclusterModel) -> Self {
        Self {
            taskcluster,
            decision_task_id: None,
            loaded: None,
            selected: None,
            schema: None,
            payload: None,
            validator: None,
            triggering: false,
            state: SessionState::Idle,
        }
    }

    /// Load the actions for `push_id`, narrowed to `job` when given, and
    /// select the first one.
    ///
    /// When nothing is available a sticky warning is sent and the session
    /// is left `Failed`.
    pub async fn open(
        &mut self,
        decision_task_map: &DecisionTaskMap,
        push_id: PushId,
        job: Option<&Job>,
        notifier: &dyn Notifier,
    ) -> Result<()> {
        let decision_task_id = decision_task_map
            .get(&push_id)
            .map(|d| d.id.clone())
            .ok_or(JobsError::MissingDecisionTask(push_id))?;

        self.reset();
        self.state = SessionState::Loading;
        self.decision_task_id = Some(decision_task_id.clone());

        let task_id = job.and_then(|job| job.task_id.as_deref());
        match self.taskcluster.load(&decision_task_id, task_id).await {
            Ok(loaded) => {
                debug!(decision_task_id = %decision_task_id, count = loaded.actions.len(), "Custom actions ready");
                self.loaded = Some(loaded);
                self.state = SessionState::Ready;
                if let Some(first) = self.actions().first().map(|a| a.name.clone()) {
                    self.select_action(&first)?;
                }
                Ok(())
            }
            Err(e) => {
                let message = if e.is_warning() {
                    notifier.notify(&e.to_string(), Severity::Warning, NotifyOptions::sticky());
                    e.to_string()
                } else {
                    let message = format_taskcluster_error(&e);
                    notifier.danger(&message);
                    message
                };
                self.state = SessionState::Failed(message);
                Err(e.into())
            }
        }
    }

    fn reset(&mut self) {
        self.loaded = None;
        self.selected = None;
        self.schema = None;
        self.payload = None;
        self.validator = None;
        self.triggering = false;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether a trigger is in progress.
    pub fn triggering(&self) -> bool {
        self.triggering
    }

    pub fn decision_task_id(&self) -> Option<&str> {
        self.decision_task_id.as_deref()
    }

    pub fn actions(&self) -> &[Action] {
        self.loaded.as_ref().map(|l| l.actions.as_slice()).unwrap_or(&[])
    }

    pub fn selected_action(&self) -> Option<&Action> {
        self.selected.and_then(|idx| self.actions().get(idx))
    }

    /// Input schema of the selected action, as YAML.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Payload text as currently edited.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn set_payload(&mut self, payload: impl Into<String>) {
        self.payload = Some(payload.into());
    }

    /// Select an action by name. With a schema, the schema and its default
    /// payload are rendered to YAML and a validator is compiled; without one,
    /// all three are cleared.
    pub fn select_action(&mut self, name: &str) -> Result<()> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| JobsError::InvalidState("Actions are not loaded yet".into()))?;
        let action = loaded.get_action(name)?;
        let index = loaded
            .actions
            .iter()
            .position(|a| a.name == action.name)
            .unwrap_or_default();

        let (schema, payload, validator) = match &action.schema {
            Some(schema) => {
                let defaults = schema_defaults(schema).unwrap_or(Value::Null);
                let validator: Box<dyn Validator> = Box::new(SchemaValidator::compile(schema)?);
                (Some(to_yaml(schema)?), Some(to_yaml(&defaults)?), Some(validator))
            }
            None => (None, None, None),
        };

        self.selected = Some(index);
        self.schema = schema;
        self.payload = payload;
        self.validator = validator;
        Ok(())
    }

    /// Validate the payload and submit the selected action.
    ///
    /// Parse and schema failures are notified, reset `triggering` and return
    /// the session to `Ready` without contacting the remote service. Remote
    /// failures are notified sticky and leave the session `Failed`.
    pub async fn trigger(&mut self, notifier: &dyn Notifier) -> Result<String> {
        if self.triggering {
            return Err(JobsError::InvalidState("A request is already in progress".into()));
        }
        let (Some(loaded), Some(action), Some(decision_task_id)) = (
            self.loaded.as_ref(),
            self.selected_action().cloned(),
            self.decision_task_id.clone(),
        ) else {
            return Err(JobsError::InvalidState("No action selected".into()));
        };

        self.triggering = true;
        self.state = SessionState::Validating;

        let input = match self.validated_input() {
            Ok(input) => input,
            Err(e) => {
                notifier.notify(&e.to_string(), Severity::Danger, NotifyOptions::default());
                self.triggering = false;
                self.state = SessionState::Ready;
                return Err(e.into());
            }
        };

        let request = SubmissionRequest::from_load(loaded, action, decision_task_id, input);
        let action_name = request.action.name.clone();
        self.state = SessionState::Submitting;

        let result = self.taskcluster.submit(request).await;
        self.triggering = false;

        match result {
            Ok(task_id) => {
                let mut message = "Custom action request sent successfully:";
                let mut url = self.taskcluster.config().task_url(&task_id);
                if LOANER_ACTIONS.contains(&action_name.as_str()) {
                    message = "Visit Taskcluster Tools site to access loaner:";
                    url.push_str("/connect");
                }
                notifier.notify(
                    message,
                    Severity::Success,
                    NotifyOptions::link("Open in Taskcluster", url),
                );
                self.state = SessionState::Succeeded(task_id.clone());
                Ok(task_id)
            }
            Err(e) => {
                let message = format_taskcluster_error(&e);
                warn!(action = %action_name, error = %e, "Custom action failed");
                notifier.danger(&message);
                self.state = SessionState::Failed(message);
                Err(e.into())
            }
        }
    }

    /// The payload the action will receive. Without a validator the text is
    /// ignored and the action gets null. With one, the text is parsed (blank
    /// parses to null) and must satisfy the schema.
    fn validated_input(&self) -> std::result::Result<Value, PayloadError> {
        let Some(validator) = &self.validator else {
            return Ok(Value::Null);
        };
        let input = parse_payload(self.payload.as_deref().unwrap_or(""))?;
        validator.validate(&input).map_err(PayloadError::Invalid)?;
        Ok(input)
    }
}

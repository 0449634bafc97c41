//! Job, push and page envelope types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::{JobsError, Result};
use ciboard_http::HttpClientError;

/// Push identifier.
pub type PushId = u64;

/// Decision task per push.
pub type DecisionTaskMap = HashMap<PushId, DecisionTaskRef>;

/// Lifecycle state of a job. Values the server adds later are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Unscheduled,
    Other(String),
}

impl JobState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Unscheduled => "unscheduled",
            Self::Other(other) => other,
        }
    }

    /// Pending or running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

impl From<String> for JobState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "completed" => Self::Completed,
            "unscheduled" => Self::Unscheduled,
            _ => Self::Other(value),
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One CI job execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub push_id: PushId,

    #[serde(default)]
    pub job_type_name: String,

    pub state: JobState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(default)]
    pub signature: String,

    /// Remaining server fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    pub fn new(id: u64, push_id: PushId, job_type_name: impl Into<String>, state: JobState) -> Self {
        Self {
            id,
            push_id,
            job_type_name: job_type_name.into(),
            state,
            task_id: None,
            signature: String::new(),
            extra: Map::new(),
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }
}

/// Jobs returned by [`crate::JobModel::get_list`], in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobList {
    pub data: Vec<Job>,
}

impl JobList {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub next_page_url: Option<String>,
}

/// One page of a paginated list response.
#[derive(Debug, Clone, Deserialize)]
pub struct PageEnvelope {
    #[serde(default, alias = "data")]
    pub results: Vec<Value>,

    #[serde(default)]
    pub next: Option<String>,

    #[serde(default)]
    pub meta: Option<PageMeta>,

    /// Column names when rows are sent as arrays.
    #[serde(default)]
    pub job_property_names: Option<Vec<String>>,
}

impl PageEnvelope {
    /// Link to the following page, if any.
    pub fn next_url(&self) -> Option<&str> {
        self.next
            .as_deref()
            .or_else(|| self.meta.as_ref().and_then(|m| m.next_page_url.as_deref()))
            .filter(|url| !url.is_empty())
    }

    /// Decode the page's rows into jobs, zipping compact rows with the
    /// property names.
    pub fn into_jobs(self) -> Result<Vec<Job>> {
        let names = self.job_property_names;
        self.results
            .into_iter()
            .map(|row| {
                let record = match (&names, row) {
                    (Some(names), Value::Array(values)) => {
                        Value::Object(names.iter().cloned().zip(values).collect())
                    }
                    (_, row) => row,
                };
                serde_json::from_value(record).map_err(|e| {
                    JobsError::Http(HttpClientError::Json(format!("malformed job record: {e}")))
                })
            })
            .collect()
    }
}

/// Decision task of a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTaskRef {
    pub id: String,

    #[serde(default, deserialize_with = "string_or_number")]
    pub run: String,
}

impl DecisionTaskRef {
    pub fn new(id: impl Into<String>, run: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            run: run.into(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Task metadata for a job, from `taskclustermetadata/`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TaskMetadata {
    pub task_id: String,
}

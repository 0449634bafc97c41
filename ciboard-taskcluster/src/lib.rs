//! # ciboard task-execution client
//!
//! Loads the actions a decision task publishes in its `public/actions.json`
//! artifact, renders action templates and submits them, either by creating a
//! task on the queue or by firing a hook.
//!
//! ```rust,no_run
//! use ciboard_taskcluster::{SubmissionRequest, TaskclusterConfig, TaskclusterModel};
//! use serde_json::json;
//!
//! # async fn run() -> ciboard_taskcluster::Result<()> {
//! let model = TaskclusterModel::new(TaskclusterConfig::default())?;
//! let loaded = model.load("LVTawdmFR2-uJiWWS2NxSw", None).await?;
//! let action = loaded.get_action("add-new-jobs")?.clone();
//!
//! let request = SubmissionRequest::from_load(
//!     &loaded,
//!     action,
//!     "LVTawdmFR2-uJiWWS2NxSw",
//!     json!({"tasks": ["test-linux64/opt-mochitest-1"], "times": 1}),
//! );
//! let task_id = model.submit(request).await?;
//! println!("created {task_id}");
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod models;
mod slugid;
pub mod template;

pub use client::TaskclusterModel;
pub use config::{DEFAULT_ROOT_URL, TaskclusterConfig};
pub use error::{Result, TaskclusterError, format_taskcluster_error};
pub use models::{Action, ActionKind, ActionsLoad, ActionsManifest, SubmissionRequest};
pub use slugid::slugid;

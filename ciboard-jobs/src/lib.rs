//! # ciboard jobs
//!
//! Job and push access for the dashboard, and the commands that act on jobs
//! through the task-execution service.
//!
//! - [`JobModel::get_list`]: paginated job listing, optionally following every
//!   next link
//! - [`PushModel`]: decision-task resolution through a shared
//!   [`DecisionTaskCache`]
//! - [`JobModel::retrigger`], [`JobModel::cancel`], [`JobModel::cancel_all`]:
//!   concurrent batch actions whose outcomes go to a [`Notifier`]
//! - [`ActionBar`]: single-job commands (backfill, isolation, profiling,
//!   interactive tasks)
//! - [`CustomActionSession`]: pick an action, edit its payload, validate and
//!   submit
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ciboard_http::HttpClient;
//! use ciboard_jobs::{DecisionTaskCache, JobFilter, JobModel, ListOptions};
//! use ciboard_taskcluster::{TaskclusterConfig, TaskclusterModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = HttpClient::with_base_url("https://treeherder.mozilla.org/api/")?;
//!     let taskcluster = TaskclusterModel::new(TaskclusterConfig::default())?;
//!     let jobs = JobModel::new(http, taskcluster, DecisionTaskCache::new());
//!
//!     let list = jobs
//!         .get_list(&JobFilter::new().push_id(526443), &ListOptions::all_pages())
//!         .await?;
//!     for job in &list.data {
//!         println!("{} {} {}", job.id, job.state, job.job_type_name);
//!     }
//!     Ok(())
//! }
//! ```

mod action_bar;
mod cache;
mod error;
mod job;
mod models;
mod notify;
mod push;
mod session;

pub use action_bar::{ActionBar, ISOLATION_TIMES, User};
pub use cache::DecisionTaskCache;
pub use error::{JobsError, Result};
pub use job::{JobFilter, JobModel, ListOptions};
pub use models::{
    DecisionTaskMap, DecisionTaskRef, Job, JobList, JobState, PageEnvelope, PageMeta, PushId,
};
pub use notify::{Notification, NotificationLog, Notifier, NotifyOptions, Severity};
pub use push::PushModel;
pub use session::{CustomActionSession, LOANER_ACTIONS, SessionState};

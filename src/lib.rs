// ciboard - client core for a CI results dashboard
//
// Paginated job access, decision-task resolution, and schema-validated
// actions submitted to the task-execution service.

// Re-export core functionality
pub use ciboard_http as http;
pub use ciboard_jobs::*;
pub use ciboard_taskcluster as taskcluster;

// Re-export optional crates
#[cfg(feature = "config")]
pub use ciboard_config;

#[cfg(feature = "log")]
pub use ciboard_log;

#[cfg(feature = "validation")]
pub use ciboard_validation;

#[cfg(feature = "perf")]
pub use ciboard_perf as perf;

#[cfg(feature = "config")]
mod dashboard;

#[cfg(feature = "config")]
pub use dashboard::Dashboard;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ActionBar,
        CustomActionSession,
        DecisionTaskCache,
        DecisionTaskMap,
        DecisionTaskRef,
        Job,
        JobFilter,
        JobModel,
        JobState,
        JobsError,
        ListOptions,
        NotificationLog,
        Notifier,
        NotifyOptions,
        PushId,
        Severity,
        User,
    };
    pub use ciboard_http::HttpClient;
    pub use ciboard_taskcluster::{TaskclusterConfig, TaskclusterModel, format_taskcluster_error};

    #[cfg(feature = "config")]
    pub use crate::Dashboard;

    #[cfg(feature = "perf")]
    pub use ciboard_perf::{CompareQuery, Comparison, PerfModel};
}

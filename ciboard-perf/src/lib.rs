//! # ciboard perf
//!
//! Side by side comparison of performance results between two revisions, or
//! between a revision and a recent window of a project.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ciboard_http::HttpClient;
//! use ciboard_perf::{CompareQuery, PerfModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = HttpClient::with_base_url("https://treeherder.mozilla.org/api/")?;
//!     let perf = PerfModel::new(http);
//!
//!     let query = CompareQuery::new("mozilla-central", "try", "abcdef123456").time_range(604_800);
//!     let comparison = perf.compare(&query).await?;
//!     println!("{}", comparison.title);
//!     for (suite, row) in comparison.regressions() {
//!         println!("{suite} {} {:+.2}%", row.name, row.delta_percentage.unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

mod compare;
mod error;
mod model;
mod models;

pub use compare::{
    CompareQuery, CompareRow, CompareTable, Comparison, MIN_MEANINGFUL_DELTA, ParentSignatures,
    T_VALUE_CARE_MIN, T_VALUE_CONFIDENCE, build_comparison, t_value,
};
pub use error::{PerfError, Result, Side};
pub use model::{PERF_SUMMARY_ENDPOINT, PerfModel};
pub use models::{DEFAULT_TIME_RANGE, PH_TIME_RANGES, PerfSummary, TimeRange};

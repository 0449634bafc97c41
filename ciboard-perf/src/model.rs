//! Performance model: summary access and comparisons.

use ciboard_http::HttpClient;
use tracing::{debug, warn};

use crate::{CompareQuery, Comparison, PerfError, PerfSummary, Result, Side, build_comparison};

pub const PERF_SUMMARY_ENDPOINT: &str = "performance/summary/";

/// Reads performance summaries from the CI results API.
#[derive(Clone)]
pub struct PerfModel {
    http: HttpClient,
}

impl PerfModel {
    /// `http` must be rooted at the CI results API (`.../api/`).
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Summaries matching `params`.
    pub async fn summaries(
        &self,
        params: &[(String, String)],
    ) -> ciboard_http::Result<Vec<PerfSummary>> {
        self.http
            .get(PERF_SUMMARY_ENDPOINT)
            .queries(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .send()
            .await?
            .error_for_status()?
            .json()
    }

    /// Fetch both sides of `query` concurrently and group them into tables.
    ///
    /// When both fetches fail the original side's error is reported.
    pub async fn compare(&self, query: &CompareQuery) -> Result<Comparison> {
        query.validate()?;
        let (original_params, new_params) = query.params();
        debug!(
            original = %query.original_project,
            new = %query.new_project,
            revision = %query.new_revision,
            framework = query.framework,
            "Fetching performance summaries"
        );

        let (original, new) = futures::join!(
            self.summaries(&original_params),
            self.summaries(&new_params)
        );
        let original = original.map_err(|source| PerfError::Summary {
            side: Side::Original,
            source,
        });
        let new = new.map_err(|source| PerfError::Summary {
            side: Side::New,
            source,
        });
        let (original, new) = match (original, new) {
            (Ok(original), Ok(new)) => (original, new),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Performance comparison failed");
                return Err(e);
            }
        };

        Ok(build_comparison(query, &original, &new))
    }
}

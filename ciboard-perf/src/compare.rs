//! Building comparison tables from two sets of summaries.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::{DEFAULT_TIME_RANGE, PerfError, PerfSummary, Result, TimeRange};

/// Absolute t value from which a difference counts at all.
pub const T_VALUE_CARE_MIN: f64 = 3.0;

/// Absolute t value from which a difference is reported as confident.
pub const T_VALUE_CONFIDENCE: f64 = 5.0;

/// Smallest relative change, in percent, that is flagged.
pub const MIN_MEANINGFUL_DELTA: f64 = 2.0;

/// Parent signatures when comparing the subtests of one suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentSignatures {
    pub original: String,
    pub new: String,
}

/// What to compare against what.
///
/// Without an `original_revision` the original side is every run of
/// `original_project` within the selected time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareQuery {
    pub original_project: String,
    pub original_revision: Option<String>,
    pub new_project: String,
    pub new_revision: String,
    pub framework: u32,
    /// Requested window in seconds; unknown windows use the default.
    pub selected_time_range: Option<u64>,
    pub subtests: Option<ParentSignatures>,
}

impl CompareQuery {
    pub fn new(
        original_project: impl Into<String>,
        new_project: impl Into<String>,
        new_revision: impl Into<String>,
    ) -> Self {
        Self {
            original_project: original_project.into(),
            original_revision: None,
            new_project: new_project.into(),
            new_revision: new_revision.into(),
            framework: 1,
            selected_time_range: None,
            subtests: None,
        }
    }

    pub fn original_revision(mut self, revision: impl Into<String>) -> Self {
        self.original_revision = Some(revision.into());
        self
    }

    pub fn framework(mut self, framework: u32) -> Self {
        self.framework = framework;
        self
    }

    pub fn time_range(mut self, seconds: u64) -> Self {
        self.selected_time_range = Some(seconds);
        self
    }

    pub fn subtests(mut self, original: impl Into<String>, new: impl Into<String>) -> Self {
        self.subtests = Some(ParentSignatures {
            original: original.into(),
            new: new.into(),
        });
        self
    }

    pub fn has_subtests(&self) -> bool {
        self.subtests.is_some()
    }

    /// The window used for the original side; none when it is pinned to a
    /// revision.
    pub fn effective_time_range(&self) -> Option<TimeRange> {
        if self.original_revision.is_some() {
            return None;
        }
        Some(
            self.selected_time_range
                .and_then(TimeRange::from_seconds)
                .unwrap_or(DEFAULT_TIME_RANGE),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.original_project.is_empty() || self.new_project.is_empty() {
            return Err(PerfError::InvalidQuery("Both projects are required".into()));
        }
        if self.new_revision.is_empty() {
            return Err(PerfError::InvalidQuery("A new revision is required".into()));
        }
        Ok(())
    }

    /// Query parameters for the original and new summary fetches.
    pub fn params(&self) -> (Vec<(String, String)>, Vec<(String, String)>) {
        let common = |project: &str| {
            vec![
                ("repository".to_string(), project.to_string()),
                ("framework".to_string(), self.framework.to_string()),
            ]
        };

        let mut original = common(&self.original_project);
        match (&self.original_revision, self.effective_time_range()) {
            (Some(revision), _) => original.push(("revision".into(), revision.clone())),
            (None, Some(range)) => original.push(("interval".into(), range.value.to_string())),
            (None, None) => {}
        }

        let mut new = common(&self.new_project);
        new.push(("revision".into(), self.new_revision.clone()));

        match &self.subtests {
            Some(parents) => {
                original.push(("parent_signature".into(), parents.original.clone()));
                new.push(("parent_signature".into(), parents.new.clone()));
            }
            None => {
                original.push(("no_subtests".into(), "true".into()));
                new.push(("no_subtests".into(), "true".into()));
            }
        }

        (original, new)
    }

    /// Page title for a suite level comparison.
    pub fn comparison_title(&self) -> String {
        let original = match &self.original_revision {
            Some(revision) => format!("{} ({})", revision, self.original_project),
            None => self.original_project.clone(),
        };
        format!(
            "Comparison between {} and {} ({})",
            original, self.new_revision, self.new_project
        )
    }
}

/// One row of a comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareRow {
    pub name: String,
    pub original_value: Option<f64>,
    pub original_runs: usize,
    pub new_value: Option<f64>,
    pub new_runs: usize,
    pub delta: Option<f64>,
    pub delta_percentage: Option<f64>,
    /// Bar length in `0..=100`.
    pub magnitude: Option<f64>,
    /// Welch's t statistic, when both sides have two or more runs.
    pub confidence: Option<f64>,
    pub lower_is_better: bool,
    pub new_is_better: bool,
    pub is_regression: bool,
    pub is_improvement: bool,
    pub is_confident: bool,
}

impl CompareRow {
    /// Compare `original` with `new`; `None` when neither side has data.
    pub fn from_pair(
        name: impl Into<String>,
        original: Option<&PerfSummary>,
        new: Option<&PerfSummary>,
    ) -> Option<Self> {
        if original.is_none() && new.is_none() {
            return None;
        }
        let lower_is_better = new.or(original).is_none_or(|s| s.lower_is_better);
        let original_values = original.map(|s| s.values.as_slice()).unwrap_or_default();
        let new_values = new.map(|s| s.values.as_slice()).unwrap_or_default();

        let original_value = mean(original_values);
        let new_value = mean(new_values);

        let delta = original_value.zip(new_value).map(|(o, n)| n - o);
        let delta_percentage = delta
            .zip(original_value)
            .filter(|&(_, o)| o != 0.0)
            .map(|(d, o)| d / o * 100.0);
        let magnitude = delta_percentage.map(|p| (p.abs() * 5.0).min(100.0));
        let confidence = t_value(original_values, new_values);

        let new_is_better = delta.is_some_and(|d| if lower_is_better { d < 0.0 } else { d > 0.0 });
        let flagged = delta_percentage.is_some_and(|p| p.abs() >= MIN_MEANINGFUL_DELTA)
            && confidence.is_some_and(|t| t >= T_VALUE_CARE_MIN);
        let changed = delta.is_some_and(|d| d != 0.0);

        Some(Self {
            name: name.into(),
            original_value,
            original_runs: original_values.len(),
            new_value,
            new_runs: new_values.len(),
            delta,
            delta_percentage,
            magnitude,
            confidence,
            lower_is_better,
            new_is_better,
            is_regression: flagged && changed && !new_is_better,
            is_improvement: flagged && new_is_better,
            is_confident: confidence.is_some_and(|t| t >= T_VALUE_CONFIDENCE),
        })
    }
}

/// Rows of one suite (or, for subtests, of the parent suite).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareTable {
    pub name: String,
    pub rows: Vec<CompareRow>,
}

/// A complete comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub title: String,
    pub table_names: Vec<String>,
    pub row_names: Vec<String>,
    pub tables: Vec<CompareTable>,
}

impl Comparison {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn regressions(&self) -> impl Iterator<Item = (&str, &CompareRow)> {
        self.tables.iter().flat_map(|table| {
            table
                .rows
                .iter()
                .filter(|row| row.is_regression)
                .map(move |row| (table.name.as_str(), row))
        })
    }
}

/// Group `original` and `new` summaries into tables.
///
/// Suite comparisons get one table per suite name with one row per platform.
/// Subtest comparisons get a single table named after the parent suite, with
/// its option dropped, and one row per subtest.
pub fn build_comparison(
    query: &CompareQuery,
    original: &[PerfSummary],
    new: &[PerfSummary],
) -> Comparison {
    let mut title = query.comparison_title();
    let all = || original.iter().chain(new.iter());

    let Some(first) = all().next() else {
        return Comparison {
            title,
            table_names: Vec::new(),
            row_names: Vec::new(),
            tables: Vec::new(),
        };
    };

    let (table_names, row_names): (Vec<String>, Vec<String>) = if query.has_subtests() {
        let mut words: Vec<&str> = first.name.split(' ').collect();
        if words.len() > 1 {
            words.remove(1);
        }
        let suite = words.join(" ");
        title = format!("{}: {}", first.platform, suite);
        let rows: BTreeSet<&str> = all().map(|s| s.test.as_str()).collect();
        (vec![suite], rows.into_iter().map(String::from).collect())
    } else {
        let tables: BTreeSet<&str> = all().map(|s| s.name.as_str()).collect();
        let rows: BTreeSet<&str> = all().map(|s| s.platform.as_str()).collect();
        (
            tables.into_iter().map(String::from).collect(),
            rows.into_iter().map(String::from).collect(),
        )
    };

    let tables = table_names
        .iter()
        .filter_map(|table| {
            let rows: Vec<CompareRow> = row_names
                .iter()
                .filter_map(|row| {
                    let matches = |s: &&PerfSummary| {
                        if query.has_subtests() {
                            s.test == *row
                        } else {
                            s.name == *table && s.platform == *row
                        }
                    };
                    CompareRow::from_pair(
                        row.as_str(),
                        original.iter().find(matches),
                        new.iter().find(matches),
                    )
                })
                .collect();
            (!rows.is_empty()).then(|| CompareTable {
                name: table.clone(),
                rows,
            })
        })
        .collect();

    Comparison {
        title,
        table_names,
        row_names,
        tables,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Absolute Welch's t between two samples.
pub fn t_value(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let (mean_a, mean_b) = (mean(a)?, mean(b)?);
    let stderr = (sample_variance(a, mean_a) / a.len() as f64
        + sample_variance(b, mean_b) / b.len() as f64)
        .sqrt();
    (stderr > 0.0).then(|| (mean_b - mean_a).abs() / stderr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> CompareQuery {
        CompareQuery::new("mozilla-central", "try", "abcdef123456")
    }

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn test_params_with_default_window() {
        let (original, new) = query().params();
        assert_eq!(
            pairs(&original),
            vec![
                ("repository", "mozilla-central"),
                ("framework", "1"),
                ("interval", "172800"),
                ("no_subtests", "true"),
            ]
        );
        assert_eq!(
            pairs(&new),
            vec![
                ("repository", "try"),
                ("framework", "1"),
                ("revision", "abcdef123456"),
                ("no_subtests", "true"),
            ]
        );
    }

    #[test]
    fn test_params_with_pinned_revision_and_subtests() {
        let query = query()
            .original_revision("012345abcdef")
            .framework(10)
            .time_range(604_800)
            .subtests("1647", "1650");
        assert_eq!(query.effective_time_range(), None);

        let (original, new) = query.params();
        assert_eq!(
            pairs(&original),
            vec![
                ("repository", "mozilla-central"),
                ("framework", "10"),
                ("revision", "012345abcdef"),
                ("parent_signature", "1647"),
            ]
        );
        assert_eq!(pairs(&new)[3], ("parent_signature", "1650"));
    }

    #[test]
    fn test_unknown_window_falls_back() {
        assert_eq!(query().time_range(5).effective_time_range(), Some(DEFAULT_TIME_RANGE));
        assert_eq!(
            query().time_range(2_592_000).effective_time_range().map(|r| r.text),
            Some("Last 30 days")
        );
    }

    #[test]
    fn test_titles() {
        assert_eq!(
            query().comparison_title(),
            "Comparison between mozilla-central and abcdef123456 (try)"
        );
        assert_eq!(
            query().original_revision("012345").comparison_title(),
            "Comparison between 012345 (mozilla-central) and abcdef123456 (try)"
        );
    }

    #[test]
    fn test_validate() {
        assert!(query().validate().is_ok());
        assert!(CompareQuery::new("", "try", "abc").validate().is_err());
        assert!(CompareQuery::new("central", "try", "").validate().is_err());
    }

    #[test]
    fn test_regression_when_lower_is_better() {
        let original = PerfSummary::new("tp5o opt", "linux64", vec![100.0, 101.0, 99.0, 100.0]);
        let new = PerfSummary::new("tp5o opt", "linux64", vec![120.0, 121.0, 119.0, 120.0]);
        let row = CompareRow::from_pair("linux64", Some(&original), Some(&new)).unwrap();

        assert_eq!(row.original_value, Some(100.0));
        assert_eq!(row.new_value, Some(120.0));
        assert_eq!(row.delta, Some(20.0));
        assert_eq!(row.delta_percentage, Some(20.0));
        assert_eq!(row.magnitude, Some(100.0));
        assert!(!row.new_is_better);
        assert!(row.is_regression);
        assert!(!row.is_improvement);
        assert!(row.is_confident);
    }

    #[test]
    fn test_improvement_when_higher_is_better() {
        let original =
            PerfSummary::new("speedometer", "win10", vec![50.0, 51.0, 49.0]).higher_is_better();
        let new = PerfSummary::new("speedometer", "win10", vec![60.0, 61.0, 59.0]).higher_is_better();
        let row = CompareRow::from_pair("win10", Some(&original), Some(&new)).unwrap();

        assert!(row.new_is_better);
        assert!(row.is_improvement);
        assert!(!row.is_regression);
    }

    #[test]
    fn test_single_runs_are_never_flagged() {
        let original = PerfSummary::new("a11yr opt", "linux64", vec![100.0]);
        let new = PerfSummary::new("a11yr opt", "linux64", vec![150.0]);
        let row = CompareRow::from_pair("linux64", Some(&original), Some(&new)).unwrap();

        assert_eq!(row.delta_percentage, Some(50.0));
        assert_eq!(row.confidence, None);
        assert!(!row.is_regression);
        assert!(!row.is_confident);
    }

    #[test]
    fn test_one_sided_and_empty_rows() {
        let new = PerfSummary::new("a11yr opt", "osx", vec![10.0, 11.0]);
        let row = CompareRow::from_pair("osx", None, Some(&new)).unwrap();
        assert_eq!(row.original_value, None);
        assert_eq!(row.new_value, Some(10.5));
        assert_eq!(row.delta, None);
        assert!(!row.is_regression);

        assert!(CompareRow::from_pair("osx", None, None).is_none());
    }

    #[test]
    fn test_t_value() {
        assert_eq!(t_value(&[1.0], &[2.0, 3.0]), None);
        assert_eq!(t_value(&[1.0, 1.0], &[1.0, 1.0]), None);
        let t = t_value(&[1.0, 3.0], &[5.0, 7.0]).unwrap();
        assert!((t - 2.828_427).abs() < 1e-5);
    }

    #[test]
    fn test_suite_tables_are_sorted_and_sparse() {
        let original = vec![
            PerfSummary::new("tp5o opt", "windows10", vec![300.0, 301.0]),
            PerfSummary::new("a11yr opt", "linux64", vec![200.0, 201.0]),
        ];
        let new = vec![
            PerfSummary::new("tp5o opt", "linux64", vec![310.0, 311.0]),
            PerfSummary::new("a11yr opt", "linux64", vec![202.0, 203.0]),
        ];
        let comparison = build_comparison(&query(), &original, &new);

        assert_eq!(comparison.table_names, vec!["a11yr opt", "tp5o opt"]);
        assert_eq!(comparison.row_names, vec!["linux64", "windows10"]);
        assert_eq!(comparison.tables.len(), 2);
        assert_eq!(comparison.tables[0].rows.len(), 1);

        let tp5o = &comparison.tables[1];
        assert_eq!(tp5o.name, "tp5o opt");
        let names: Vec<&str> = tp5o.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["linux64", "windows10"]);
        assert_eq!(tp5o.rows[0].original_value, None);
        assert_eq!(tp5o.rows[1].new_value, None);
    }

    #[test]
    fn test_subtest_table_and_title() {
        let query = query().subtests("1647", "1650");
        let original = vec![
            PerfSummary::new("tp5o opt e10s", "linux64", vec![10.0, 11.0]).with_test("yahoo.com"),
            PerfSummary::new("tp5o opt e10s", "linux64", vec![20.0, 21.0]).with_test("amazon.com"),
        ];
        let new = vec![
            PerfSummary::new("tp5o opt e10s", "linux64", vec![10.0, 12.0]).with_test("yahoo.com"),
        ];
        let comparison = build_comparison(&query, &original, &new);

        assert_eq!(comparison.title, "linux64: tp5o e10s");
        assert_eq!(comparison.table_names, vec!["tp5o e10s"]);
        assert_eq!(comparison.row_names, vec!["amazon.com", "yahoo.com"]);
        assert_eq!(comparison.tables[0].rows[1].new_value, Some(11.0));
    }

    #[test]
    fn test_no_data_is_empty() {
        let comparison = build_comparison(&query(), &[], &[]);
        assert!(comparison.is_empty());
        assert_eq!(
            comparison.title,
            "Comparison between mozilla-central and abcdef123456 (try)"
        );
    }

    #[test]
    fn test_regressions_iterator() {
        let original = vec![PerfSummary::new("tp5o opt", "linux64", vec![100.0, 101.0, 99.0])];
        let new = vec![PerfSummary::new("tp5o opt", "linux64", vec![130.0, 131.0, 129.0])];
        let comparison = build_comparison(&query(), &original, &new);
        let found: Vec<(&str, &str)> = comparison
            .regressions()
            .map(|(table, row)| (table, row.name.as_str()))
            .collect();
        assert_eq!(found, vec![("tp5o opt", "linux64")]);
    }
}

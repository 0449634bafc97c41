//! Performance summary records and comparison time ranges.

use serde::{Deserialize, Serialize};

/// One signature's summary as returned by `performance/summary/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfSummary {
    #[serde(default)]
    pub signature_id: u64,
    /// Suite name, including its option and extra options.
    pub name: String,
    pub platform: String,
    /// Subtest name; empty for suite level summaries.
    #[serde(default)]
    pub test: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default = "lower_is_better_default")]
    pub lower_is_better: bool,
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_signature: Option<u64>,
}

fn lower_is_better_default() -> bool {
    true
}

impl PerfSummary {
    pub fn new(name: impl Into<String>, platform: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            signature_id: 0,
            name: name.into(),
            platform: platform.into(),
            test: String::new(),
            suite: String::new(),
            lower_is_better: true,
            values,
            parent_signature: None,
        }
    }

    pub fn with_test(mut self, test: impl Into<String>) -> Self {
        self.test = test.into();
        self
    }

    pub fn higher_is_better(mut self) -> Self {
        self.lower_is_better = false;
        self
    }
}

/// A selectable comparison window for the original side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    /// Window length in seconds.
    pub value: u64,
    pub text: &'static str,
}

const DAY: u64 = 86_400;

/// Windows offered when the original side has no revision.
pub const PH_TIME_RANGES: [TimeRange; 8] = [
    TimeRange { value: DAY, text: "Last day" },
    TimeRange { value: DAY * 2, text: "Last 2 days" },
    TimeRange { value: DAY * 7, text: "Last 7 days" },
    TimeRange { value: DAY * 14, text: "Last 14 days" },
    TimeRange { value: DAY * 30, text: "Last 30 days" },
    TimeRange { value: DAY * 60, text: "Last 60 days" },
    TimeRange { value: DAY * 90, text: "Last 90 days" },
    TimeRange { value: DAY * 365, text: "Last year" },
];

pub const DEFAULT_TIME_RANGE: TimeRange = PH_TIME_RANGES[1];

impl TimeRange {
    /// The offered range of exactly `seconds`.
    pub fn from_seconds(seconds: u64) -> Option<TimeRange> {
        PH_TIME_RANGES.iter().copied().find(|r| r.value == seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_defaults() {
        let summary: PerfSummary = serde_json::from_value(json!({
            "name": "tp5o opt e10s",
            "platform": "linux64",
            "values": [210.5, 212.0],
            "framework_id": 1
        }))
        .unwrap();
        assert!(summary.lower_is_better);
        assert_eq!(summary.test, "");
        assert_eq!(summary.values, vec![210.5, 212.0]);
    }

    #[test]
    fn test_time_ranges() {
        assert_eq!(DEFAULT_TIME_RANGE.value, 172_800);
        assert_eq!(TimeRange::from_seconds(604_800).map(|r| r.text), Some("Last 7 days"));
        assert_eq!(TimeRange::from_seconds(1), None);
    }
}

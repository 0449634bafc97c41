//! Performance comparison.

use ciboard_perf::CompareQuery;
use colored::Colorize;

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::{compare_row_line, create_spinner, heading, info};

/// Options for `ciboard compare`.
pub struct CompareArgs {
    pub original_project: Option<String>,
    pub original_revision: Option<String>,
    pub new_project: Option<String>,
    pub new_revision: String,
    pub framework: u32,
    pub interval: Option<u64>,
    pub parent_signatures: Option<(String, String)>,
    pub regressions_only: bool,
    pub json: bool,
}

impl CompareArgs {
    /// Projects default to the configured repository.
    fn query(self, repo: &str) -> CompareQuery {
        let mut query = CompareQuery::new(
            self.original_project.unwrap_or_else(|| repo.to_string()),
            self.new_project.unwrap_or_else(|| repo.to_string()),
            self.new_revision,
        )
        .framework(self.framework);
        if let Some(revision) = self.original_revision {
            query = query.original_revision(revision);
        }
        if let Some(interval) = self.interval {
            query = query.time_range(interval);
        }
        if let Some((original, new)) = self.parent_signatures {
            query = query.subtests(original, new);
        }
        query
    }
}

pub async fn compare(ctx: &Context, args: CompareArgs) -> CliResult<()> {
    let (regressions_only, json) = (args.regressions_only, args.json);
    let query = args.query(&ctx.config.repo);

    let spinner = (!json).then(|| create_spinner("Fetching performance data..."));
    let result = ctx.perf.compare(&query).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let comparison = result?;

    if json {
        let json = serde_json::to_string_pretty(&comparison)
            .map_err(|e| CliError::Client(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    heading(&comparison.title);
    if let Some(range) = query.effective_time_range() {
        info(&format!("Original: {} of {}", range.text, query.original_project));
    }
    if comparison.is_empty() {
        info("No performance data for these revisions");
        return Ok(());
    }

    for table in &comparison.tables {
        let rows: Vec<_> = table
            .rows
            .iter()
            .filter(|row| !regressions_only || row.is_regression)
            .collect();
        if rows.is_empty() {
            continue;
        }
        println!("  {}", table.name.cyan().bold());
        for row in rows {
            println!("{}", compare_row_line(row));
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CompareArgs {
        CompareArgs {
            original_project: None,
            original_revision: None,
            new_project: Some("try".into()),
            new_revision: "abcdef123456".into(),
            framework: 1,
            interval: None,
            parent_signatures: None,
            regressions_only: false,
            json: false,
        }
    }

    #[test]
    fn test_query_defaults_to_configured_repo() {
        let query = args().query("autoland");
        assert_eq!(query.original_project, "autoland");
        assert_eq!(query.new_project, "try");
        assert!(!query.has_subtests());
    }

    #[test]
    fn test_query_carries_options() {
        let query = CompareArgs {
            original_revision: Some("012345".into()),
            interval: Some(604_800),
            parent_signatures: Some(("1647".into(), "1650".into())),
            ..args()
        }
        .query("autoland");
        assert_eq!(query.original_revision.as_deref(), Some("012345"));
        assert_eq!(query.selected_time_range, Some(604_800));
        assert!(query.has_subtests());
    }
}

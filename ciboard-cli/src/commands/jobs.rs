//! Read-only commands: job listing and decision-task lookup.

use ciboard_jobs::{JobFilter, ListOptions, PushId};
use colored::Colorize;

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::{create_spinner, heading, info, job_line};

/// Options for `ciboard jobs`.
pub struct ListArgs {
    pub push_id: Option<PushId>,
    pub count: Option<usize>,
    pub state: Option<String>,
    pub filters: Vec<(String, String)>,
    pub all: bool,
    pub json: bool,
}

pub async fn list(ctx: &Context, args: ListArgs) -> CliResult<()> {
    let mut filter = JobFilter::new();
    if let Some(push_id) = args.push_id {
        filter = filter.push_id(push_id);
    }
    if let Some(count) = args.count {
        filter = filter.count(count);
    }
    if let Some(state) = args.state {
        filter = filter.param("state", state);
    }
    for (key, value) in args.filters {
        filter = filter.param(key, value);
    }

    let options = ListOptions {
        fetch_all: args.all,
        uri: None,
    };

    let spinner = (!args.json).then(|| create_spinner("Fetching jobs..."));
    let result = ctx.jobs.get_list(&filter, &options).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let list = result.map_err(|e| CliError::Client(e.to_string()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&list.data)
            .map_err(|e| CliError::Client(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    heading(&format!("{} jobs", list.len()));
    for job in &list.data {
        println!("{}", job_line(job));
    }
    println!();
    Ok(())
}

pub async fn decision_tasks(ctx: &Context, push_ids: &[PushId]) -> CliResult<()> {
    let map = ctx
        .jobs
        .push_model()
        .decision_task_map(&ctx.config.repo, push_ids, Some(&ctx.notifier))
        .await?;

    for push_id in push_ids {
        match map.get(push_id) {
            Some(decision_task) => println!(
                "  {:>10}  {}  {}",
                push_id,
                decision_task.id.cyan(),
                format!("run {}", decision_task.run).dimmed()
            ),
            None => info(&format!("{push_id}: no decision task")),
        }
    }
    Ok(())
}

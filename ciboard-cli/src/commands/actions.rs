//! Commands that submit actions: batch retrigger and cancel, single-job
//! commands, and custom actions.

use ciboard_jobs::{CustomActionSession, PushId};
use colored::Colorize;
use dialoguer::Confirm;
use std::path::PathBuf;

use super::{Context, batch_result};
use crate::error::{CliError, CliResult};
use crate::output::{heading, info};

pub async fn retrigger(ctx: &Context, push_id: PushId, job_ids: &[u64], times: u32) -> CliResult<()> {
    let jobs = ctx.select_jobs(push_id, job_ids).await?;
    let outcomes = ctx
        .action_bar()
        .retrigger(&jobs, times, &ctx.notifier, None)
        .await?;
    batch_result(&outcomes)
}

pub async fn cancel(ctx: &Context, push_id: PushId, job_ids: &[u64]) -> CliResult<()> {
    let jobs = ctx.select_jobs(push_id, job_ids).await?;
    let outcomes = ctx.action_bar().cancel(&jobs, &ctx.notifier, None).await?;
    if outcomes.is_empty() {
        info("No pending or running jobs to cancel");
    }
    batch_result(&outcomes)
}

pub async fn cancel_all(ctx: &Context, push_id: PushId, yes: bool) -> CliResult<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("  Cancel all jobs of push {push_id}?"))
            .default(false)
            .interact()
            .map_err(|e| CliError::Io(e.into()))?;
        if !confirmed {
            return Err(CliError::Aborted);
        }
    }
    ctx.action_bar().cancel_all(push_id, &ctx.notifier).await?;
    Ok(())
}

pub async fn backfill(ctx: &Context, push_id: PushId, job_id: u64) -> CliResult<()> {
    let job = ctx.select_job(push_id, job_id).await?;
    ctx.action_bar().backfill(&job, &ctx.notifier).await?;
    Ok(())
}

pub async fn isolate(ctx: &Context, push_id: PushId, job_id: u64, times: u32) -> CliResult<()> {
    let job = ctx.select_job(push_id, job_id).await?;
    ctx.action_bar().isolate(&job, times, &ctx.notifier).await?;
    Ok(())
}

pub async fn gecko_profile(ctx: &Context, push_id: PushId, job_id: u64) -> CliResult<()> {
    let job = ctx.select_job(push_id, job_id).await?;
    ctx.action_bar().gecko_profile(&job, &ctx.notifier).await?;
    Ok(())
}

pub async fn interactive(ctx: &Context, push_id: PushId, job_id: u64) -> CliResult<()> {
    let job = ctx.select_job(push_id, job_id).await?;
    ctx.action_bar().create_interactive(&job, &ctx.notifier).await?;
    Ok(())
}

async fn open_session(ctx: &Context, push_id: PushId, job_id: Option<u64>) -> CliResult<CustomActionSession> {
    let job = match job_id {
        Some(job_id) => Some(ctx.select_job(push_id, job_id).await?),
        None => None,
    };
    let session = ctx
        .action_bar()
        .custom_action(push_id, job.as_ref(), &ctx.notifier)
        .await?;
    Ok(session)
}

pub async fn list(ctx: &Context, push_id: PushId, job_id: Option<u64>) -> CliResult<()> {
    let session = open_session(ctx, push_id, job_id).await?;

    heading(&format!("{} actions", session.actions().len()));
    for action in session.actions() {
        println!(
            "  {:<32} {:<6} {}",
            action.name.cyan(),
            action.kind.to_string().dimmed(),
            action.title
        );
    }
    println!();
    Ok(())
}

/// Where `actions trigger` takes its payload from.
pub enum PayloadSource {
    /// The action's schema defaults.
    Defaults,
    Inline(String),
    File(PathBuf),
}

pub struct TriggerArgs {
    pub push_id: PushId,
    pub job_id: Option<u64>,
    pub action: String,
    pub payload: PayloadSource,
    pub show_schema: bool,
    pub dry_run: bool,
}

pub async fn trigger(ctx: &Context, args: TriggerArgs) -> CliResult<()> {
    let mut session = open_session(ctx, args.push_id, args.job_id).await?;
    session
        .select_action(&args.action)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    if args.show_schema {
        match session.schema() {
            Some(schema) => {
                heading("Schema");
                println!("{schema}");
            }
            None => info("This action takes no input"),
        }
    }

    match args.payload {
        PayloadSource::Defaults => {}
        PayloadSource::Inline(text) => session.set_payload(text),
        PayloadSource::File(path) => session.set_payload(std::fs::read_to_string(path)?),
    }
    if session.schema().is_none() && session.payload().is_some() {
        info("This action takes no input; the payload is ignored");
    }

    if args.dry_run {
        heading("Payload");
        println!("{}", session.payload().unwrap_or(""));
        return Ok(());
    }

    session.trigger(&ctx.notifier).await?;
    Ok(())
}

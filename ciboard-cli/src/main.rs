//! ciboard CLI - inspect CI jobs and trigger actions against them.
//!
//! # Commands
//!
//! - `ciboard jobs` - List jobs, optionally following every page
//! - `ciboard decision-task <push>...` - Resolve decision tasks for pushes
//! - `ciboard retrigger` - Retrigger jobs of a push
//! - `ciboard cancel` - Cancel pending and running jobs
//! - `ciboard cancel-all` - Cancel every job of a push
//! - `ciboard actions list|trigger` - Custom actions
//! - `ciboard backfill|isolate|gecko-profile|interactive` - Single-job commands
//! - `ciboard compare` - Compare performance results of two revisions
//! - `ciboard completions` - Generate shell completions

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use std::io;
use std::path::PathBuf;

mod commands;
mod error;
mod output;

use ciboard_config::DashboardConfig;
use ciboard_jobs::PushId;
use ciboard_log::LogConfig;
use commands::{Context, actions, jobs, perf};
use error::{CliError, CliResult};

/// ciboard - CI results dashboard client
#[derive(Parser)]
#[command(name = "ciboard")]
#[command(version)]
#[command(about = "Inspect CI jobs and trigger actions against them")]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} ciboard jobs --push 526443 --all\n  {} ciboard retrigger --push 526443 259537375\n  {} ciboard actions list --push 526443\n",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true, env = "CIBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Repository to operate on (overrides the configuration)
    #[arg(short, long, global = true)]
    repo: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List jobs
    #[command(alias = "ls")]
    Jobs(JobsArgs),

    /// Resolve the decision task of one or more pushes
    #[command(name = "decision-task", alias = "dt")]
    DecisionTask {
        /// Push ids
        #[arg(required = true)]
        push_ids: Vec<PushId>,
    },

    /// Retrigger jobs of a push
    #[command(alias = "rt")]
    Retrigger(RetriggerArgs),

    /// Cancel pending and running jobs of a push
    Cancel(JobsOfPush),

    /// Cancel every job of a push
    #[command(name = "cancel-all")]
    CancelAll {
        #[arg(short, long)]
        push: PushId,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Custom actions
    Actions {
        #[command(subcommand)]
        command: ActionsCommands,
    },

    /// Backfill a job on previous pushes
    Backfill(SingleJob),

    /// Re-run the failing tests of a completed job
    Isolate {
        #[command(flatten)]
        job: SingleJob,

        /// Number of times to run the isolation jobs (1-100)
        #[arg(short, long, default_value = "5")]
        times: u32,
    },

    /// Collect a Gecko profile for a job
    #[command(name = "gecko-profile")]
    GeckoProfile(SingleJob),

    /// Start an interactive task for a job
    Interactive(SingleJob),

    /// Compare performance results of a revision against a baseline
    Compare(CompareArgs),

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct JobsArgs {
    /// Only jobs of this push
    #[arg(short, long)]
    push: Option<PushId>,

    /// Page size
    #[arg(long)]
    count: Option<usize>,

    /// Only jobs in this state (pending, running, completed)
    #[arg(long)]
    state: Option<String>,

    /// Extra query filters as key=value
    #[arg(short, long = "filter", value_parser = parse_key_value)]
    filters: Vec<(String, String)>,

    /// Follow every next page
    #[arg(short, long)]
    all: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct JobsOfPush {
    #[arg(short, long)]
    push: PushId,

    /// Job ids
    #[arg(required = true)]
    jobs: Vec<u64>,
}

#[derive(Args)]
struct RetriggerArgs {
    #[command(flatten)]
    target: JobsOfPush,

    /// Number of times to retrigger each job
    #[arg(short, long, default_value = "1")]
    times: u32,
}

#[derive(Args)]
struct SingleJob {
    #[arg(short, long)]
    push: PushId,

    /// Job id
    job: u64,
}

#[derive(Args)]
struct CompareArgs {
    /// Revision to compare
    #[arg(long)]
    new_revision: String,

    /// Project of the new revision (defaults to the repository)
    #[arg(long)]
    new_project: Option<String>,

    /// Baseline project (defaults to the repository)
    #[arg(long)]
    original_project: Option<String>,

    /// Baseline revision; without it the baseline is a recent window
    #[arg(long, conflicts_with = "interval")]
    original_revision: Option<String>,

    /// Baseline window in seconds (86400, 172800, 604800, ...)
    #[arg(long)]
    interval: Option<u64>,

    /// Performance framework id
    #[arg(long, default_value = "1")]
    framework: u32,

    /// Compare subtests of the baseline suite with this signature
    #[arg(long, requires = "new_signature")]
    original_signature: Option<String>,

    /// Compare subtests of the new suite with this signature
    #[arg(long, requires = "original_signature")]
    new_signature: Option<String>,

    /// Only show regressions
    #[arg(long)]
    regressions: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ActionsCommands {
    /// List the actions available for a push, or for one of its jobs
    List {
        #[arg(short, long)]
        push: PushId,

        #[arg(short, long)]
        job: Option<u64>,
    },

    /// Validate a payload and trigger an action
    Trigger {
        #[arg(short, long)]
        push: PushId,

        #[arg(short, long)]
        job: Option<u64>,

        /// Action name
        action: String,

        /// Payload as inline YAML
        #[arg(short, long, conflicts_with = "payload_file")]
        input: Option<String>,

        /// Payload read from a YAML file
        #[arg(long)]
        payload_file: Option<PathBuf>,

        /// Print the action's schema first
        #[arg(long)]
        show_schema: bool,

        /// Print the payload instead of triggering
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

fn load_config(cli: &Cli) -> CliResult<DashboardConfig> {
    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(repo) = &cli.repo {
        config.repo = repo.clone();
    }
    Ok(config)
}

async fn run(cli: Cli) -> CliResult<()> {
    if let Commands::Completions { shell } = cli.command {
        generate(shell, &mut Cli::command(), "ciboard", &mut io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let ctx = Context::new(config, cli.quiet)?;

    match cli.command {
        Commands::Jobs(args) => {
            jobs::list(
                &ctx,
                jobs::ListArgs {
                    push_id: args.push,
                    count: args.count,
                    state: args.state,
                    filters: args.filters,
                    all: args.all,
                    json: args.json,
                },
            )
            .await
        }
        Commands::DecisionTask { push_ids } => jobs::decision_tasks(&ctx, &push_ids).await,
        Commands::Retrigger(args) => {
            actions::retrigger(&ctx, args.target.push, &args.target.jobs, args.times).await
        }
        Commands::Cancel(args) => actions::cancel(&ctx, args.push, &args.jobs).await,
        Commands::CancelAll { push, yes } => actions::cancel_all(&ctx, push, yes).await,
        Commands::Actions { command } => match command {
            ActionsCommands::List { push, job } => actions::list(&ctx, push, job).await,
            ActionsCommands::Trigger {
                push,
                job,
                action,
                input,
                payload_file,
                show_schema,
                dry_run,
            } => {
                let payload = match (input, payload_file) {
                    (Some(text), _) => actions::PayloadSource::Inline(text),
                    (None, Some(path)) => actions::PayloadSource::File(path),
                    (None, None) => actions::PayloadSource::Defaults,
                };
                actions::trigger(
                    &ctx,
                    actions::TriggerArgs {
                        push_id: push,
                        job_id: job,
                        action,
                        payload,
                        show_schema,
                        dry_run,
                    },
                )
                .await
            }
        },
        Commands::Backfill(job) => actions::backfill(&ctx, job.push, job.job).await,
        Commands::Isolate { job, times } => actions::isolate(&ctx, job.push, job.job, times).await,
        Commands::GeckoProfile(job) => actions::gecko_profile(&ctx, job.push, job.job).await,
        Commands::Interactive(job) => actions::interactive(&ctx, job.push, job.job).await,
        Commands::Compare(args) => {
            perf::compare(
                &ctx,
                perf::CompareArgs {
                    original_project: args.original_project,
                    original_revision: args.original_revision,
                    new_project: args.new_project,
                    new_revision: args.new_revision,
                    framework: args.framework,
                    interval: args.interval,
                    parent_signatures: args.original_signature.zip(args.new_signature),
                    regressions_only: args.regressions,
                    json: args.json,
                },
            )
            .await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    if cli.no_color {
        log_config = log_config.with_color(false);
    }
    ciboard_log::init_with(&log_config);

    if let Err(e) = run(cli).await {
        // Action failures were already shown by the notifier.
        if !matches!(e, CliError::Jobs(_) | CliError::Partial { .. }) {
            eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        }
        std::process::exit(e.exit_code());
    }
}

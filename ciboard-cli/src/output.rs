//! Terminal output: notification rendering and small print helpers.

use ciboard_jobs::{Job, Notifier, NotifyOptions, Severity};
use ciboard_perf::CompareRow;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Prints notifications as they arrive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity, options: NotifyOptions) {
        if self.quiet && matches!(severity, Severity::Info | Severity::Success) {
            return;
        }
        let line = render(message, severity);
        match severity {
            Severity::Warning | Severity::Danger => eprintln!("{line}"),
            _ => println!("{line}"),
        }
        if let Some(url) = options.url {
            let text = options.link_text.unwrap_or_else(|| "Link".to_string());
            println!("    {} {}", format!("{text}:").dimmed(), url.underline());
        }
    }
}

fn render(message: &str, severity: Severity) -> String {
    match severity {
        Severity::Info => format!("  {} {}", "→".cyan(), message),
        Severity::Success => format!("  {} {}", "✓".green().bold(), message.green()),
        Severity::Warning => format!("  {} {}", "⚠".yellow().bold(), message.yellow()),
        Severity::Danger => format!("  {} {}", "✗".red().bold(), message.red()),
    }
}

pub fn info(msg: &str) {
    println!("  {} {}", "→".cyan(), msg);
}

pub fn heading(msg: &str) {
    println!("\n  {}\n", msg.bright_white().bold());
}

/// Create a spinner progress indicator.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// One job per line: id, coloured state, job type.
pub fn job_line(job: &Job) -> String {
    let state = job.state.as_str();
    let state = match job.state {
        ciboard_jobs::JobState::Completed => state.green(),
        ciboard_jobs::JobState::Running => state.cyan(),
        ciboard_jobs::JobState::Pending => state.yellow(),
        _ => state.dimmed(),
    };
    format!("  {:>10}  {:<11}  {}", job.id, state, job.job_type_name)
}

/// One comparison row: name, both means, relative change and verdict.
pub fn compare_row_line(row: &CompareRow) -> String {
    let value = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
    let delta = row
        .delta_percentage
        .map_or_else(|| "-".to_string(), |p| format!("{p:+.2}%"));
    let verdict = if row.is_regression {
        "regression".red().bold()
    } else if row.is_improvement {
        "improvement".green().bold()
    } else {
        "".normal()
    };
    format!(
        "  {:<28} {:>12} {:>12} {:>10}  {}",
        row.name,
        value(row.original_value),
        value(row.new_value),
        delta,
        verdict
    )
    .trim_end()
    .to_string()
}

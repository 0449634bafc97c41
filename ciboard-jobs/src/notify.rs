//! Notification sink for user-facing messages.

use parking_lot::Mutex;
use std::fmt;

/// How prominently a notification is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display options attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyOptions {
    /// Stays until dismissed.
    pub sticky: bool,
    pub link_text: Option<String>,
    pub url: Option<String>,
}

impl NotifyOptions {
    pub fn sticky() -> Self {
        Self {
            sticky: true,
            ..Default::default()
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            sticky: false,
            link_text: Some(text.into()),
            url: Some(url.into()),
        }
    }
}

/// Receives user-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity, options: NotifyOptions);

    fn info(&self, message: &str) {
        self.notify(message, Severity::Info, NotifyOptions::default());
    }

    fn success(&self, message: &str) {
        self.notify(message, Severity::Success, NotifyOptions::default());
    }

    /// Danger, sticky.
    fn danger(&self, message: &str) {
        self.notify(message, Severity::Danger, NotifyOptions::sticky());
    }
}

impl<F> Notifier for F
where
    F: Fn(&str, Severity, NotifyOptions) + Send + Sync,
{
    fn notify(&self, message: &str, severity: Severity, options: NotifyOptions) {
        self(message, severity, options)
    }
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub options: NotifyOptions,
}

/// Notifier that keeps every message in delivery order.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|n| n.message.clone()).collect()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<Notification> {
        self.entries
            .lock()
            .iter()
            .filter(|n| n.severity == severity)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, message: &str, severity: Severity, options: NotifyOptions) {
        self.entries.lock().push(Notification {
            message: message.to_string(),
            severity,
            options,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_notifier() {
        let count = AtomicUsize::new(0);
        let notifier = |_: &str, severity: Severity, options: NotifyOptions| {
            assert_eq!(severity, Severity::Danger);
            assert!(options.sticky);
            count.fetch_add(1, Ordering::SeqCst);
        };
        notifier.danger("boom");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_log_keeps_order() {
        let log = NotificationLog::new();
        log.info("first");
        log.notify(
            "second",
            Severity::Success,
            NotifyOptions::link("Open in Taskcluster", "https://tc.example.com/tasks/x"),
        );

        assert_eq!(log.messages(), vec!["first", "second"]);
        let success = log.with_severity(Severity::Success);
        assert_eq!(success[0].options.url.as_deref(), Some("https://tc.example.com/tasks/x"));

        log.clear();
        assert!(log.entries().is_empty());
    }
}

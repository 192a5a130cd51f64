use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Visual style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    #[default]
    Default,
    /// Error styling.
    Destructive,
}

/// User-facing toast raised after an operation completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
            raised_at: Utc::now(),
        }
    }

    /// Destructive "Error" notification carrying `description`.
    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
            raised_at: Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}

/// Fire-and-forget sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

fn log_notification(notification: &Notification) {
    match notification.variant {
        NotificationVariant::Default => tracing::info!(
            "🔔 {}: {}",
            notification.title,
            notification.description
        ),
        NotificationVariant::Destructive => tracing::warn!(
            "🔔 {}: {}",
            notification.title,
            notification.description
        ),
    }
}

/// Notifier that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        log_notification(&notification);
    }
}

/// Notifier that logs and keeps the most recent notifications in memory.
pub struct NotificationLog {
    entries: Mutex<VecDeque<Notification>>,
    capacity: usize,
}

impl NotificationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
        }
    }

    /// Retained notifications, oldest first.
    pub fn recent(&self) -> Vec<Notification> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    /// Most recently raised notification.
    pub fn last(&self) -> Option<Notification> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.back().cloned()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        log_notification(&notification);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_keeps_most_recent() {
        let log = NotificationLog::new(2);
        log.notify(Notification::success("one", "first"));
        log.notify(Notification::success("two", "second"));
        log.notify(Notification::failure("third"));

        let titles: Vec<String> = log.recent().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["two", "Error"]);
        assert!(log.last().unwrap().is_failure());
    }

    #[test]
    fn test_variant_serializes_lowercase() {
        let value = serde_json::to_value(Notification::failure("boom")).unwrap();
        assert_eq!(value["variant"], "destructive");
        assert_eq!(value["title"], "Error");
    }

    #[test]
    fn test_notifiers_are_interchangeable() {
        let sinks: Vec<Box<dyn Notifier>> =
            vec![Box::new(TracingNotifier), Box::new(NotificationLog::new(4))];
        for sink in &sinks {
            sink.notify(Notification::success("Lead created", "New lead has been successfully added"));
        }
    }
}

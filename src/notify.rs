use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::service::Notifier;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
}

/// A transient toast shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Success".into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Warning,
            title: "Warning".into(),
            message: message.into(),
        }
    }
}

/// Writes notifications to the log instead of a toast surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                info!("{}: {}", notification.title, notification.message)
            }
            NotificationKind::Warning => {
                warn!("{}: {}", notification.title, notification.message)
            }
            NotificationKind::Error => {
                error!("{}: {}", notification.title, notification.message)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Captures everything it is asked to show.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn kinds(&self) -> Vec<NotificationKind> {
            self.seen.lock().unwrap().iter().map(|n| n.kind).collect()
        }

        pub fn last(&self) -> Option<Notification> {
            self.seen.lock().unwrap().last().cloned()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.lock().unwrap().push(notification);
        }
    }
}

//! Collaborators the engine talks to but does not own.
//!
//! The data service is the only source of truth for labels and assignments.
//! Navigation and notifications are fire-and-forget side effects.

use anyhow::Result;
use async_trait::async_trait;
use log::info;

use crate::db::models::{Label, LabelAssignment};
use crate::notify::Notification;

#[async_trait]
pub trait DataService: Send + Sync {
    async fn list_labels(&self) -> Result<Vec<Label>>;

    async fn list_assignments(&self, label_id: &str) -> Result<Vec<LabelAssignment>>;

    async fn delete_assignment(&self, assignment_id: &str) -> Result<()>;

    async fn delete_assignments(&self, assignment_ids: &[String]) -> Result<()>;

    /// Removes the label and all of its assignments.
    async fn delete_label(&self, label_id: &str) -> Result<()>;
}

/// Resolves a business record id to its detail view.
pub trait Navigator: Send + Sync {
    fn navigate_to_record(&self, item_id: &str);
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Navigator for headless hosts: records the target in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate_to_record(&self, item_id: &str) {
        info!("Navigate to record {} ({})", item_id, record_url(item_id));
    }
}

pub fn record_url(item_id: &str) -> String {
    format!("/lightning/r/{item_id}/view")
}

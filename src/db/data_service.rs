use anyhow::Result;
use async_trait::async_trait;

use super::{
    connection::Database,
    models::{Label, LabelAssignment},
};
use crate::service::DataService;

#[async_trait]
impl DataService for Database {
    async fn list_labels(&self) -> Result<Vec<Label>> {
        self.get_labels().await
    }

    async fn list_assignments(&self, label_id: &str) -> Result<Vec<LabelAssignment>> {
        self.get_assignments(label_id).await
    }

    async fn delete_assignment(&self, assignment_id: &str) -> Result<()> {
        Database::delete_assignment(self, assignment_id).await
    }

    async fn delete_assignments(&self, assignment_ids: &[String]) -> Result<()> {
        Database::delete_assignments(self, assignment_ids.to_vec()).await
    }

    async fn delete_label(&self, label_id: &str) -> Result<()> {
        Database::delete_label(self, label_id.to_string()).await
    }
}

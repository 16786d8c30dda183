//! Label picker and assignment table wired together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::Mutex;

use crate::{
    engine::{AssignmentTable, DeleteTarget, LoadOutcome},
    errors::EngineError,
    labels::{LabelDeleted, LabelSelector},
    popover::RecordDetail,
    service::{DataService, Navigator, Notifier},
    settings::TableSettings,
};

/// Per-row menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    ViewRecord,
    Delete,
}

impl RowAction {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "view" | "view_record" => Some(RowAction::ViewRecord),
            "delete" => Some(RowAction::Delete),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct LabelAssignmentViewer {
    selector: LabelSelector,
    table: AssignmentTable,
    navigator: Arc<dyn Navigator>,
    last_refreshed: Arc<Mutex<DateTime<Utc>>>,
}

impl LabelAssignmentViewer {
    pub fn new(
        service: Arc<dyn DataService>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        settings: &TableSettings,
    ) -> Self {
        Self {
            selector: LabelSelector::new(service.clone(), notifier.clone()),
            table: AssignmentTable::new(service, notifier, settings),
            navigator,
            last_refreshed: Arc::new(Mutex::new(Utc::now())),
        }
    }

    pub fn selector(&self) -> &LabelSelector {
        &self.selector
    }

    pub fn table(&self) -> &AssignmentTable {
        &self.table
    }

    pub async fn last_refreshed(&self) -> DateTime<Utc> {
        *self.last_refreshed.lock().await
    }

    /// A new label was picked: reset the search and load its assignments.
    pub async fn handle_label_select(
        &self,
        label_id: Option<&str>,
    ) -> Result<LoadOutcome, EngineError> {
        let selection = self.selector.select(label_id).await;
        info!(
            "Label selected: {} ({})",
            selection.label_name,
            selection.label_id.as_deref().unwrap_or("none")
        );
        self.table.set_search_term("").await;
        self.table.load(label_id).await
    }

    pub async fn handle_row_action(
        &self,
        action: RowAction,
        assignment_id: &str,
    ) -> Result<(), EngineError> {
        match action {
            RowAction::ViewRecord => {
                let record = self.table.record(assignment_id).await.ok_or_else(|| {
                    EngineError::Validation(format!("No assignment {assignment_id} on screen"))
                })?;
                self.navigator.navigate_to_record(&record.item_id);
                Ok(())
            }
            RowAction::Delete => {
                self.table
                    .request_delete(DeleteTarget::One(assignment_id.to_string()))
                    .await
            }
        }
    }

    pub async fn record_detail(&self, assignment_id: &str) -> Option<RecordDetail> {
        self.table
            .record(assignment_id)
            .await
            .map(|record| RecordDetail::from(&record))
    }

    /// Confirm the pending label delete; the table empties when it succeeds.
    pub async fn delete_selected_label(&self) -> Result<Option<LabelDeleted>, EngineError> {
        let deleted = self.selector.confirm_delete_label().await?;
        if deleted.is_some() {
            self.table.load(None).await?;
        }
        Ok(deleted)
    }

    /// Refresh labels and the open table side by side.
    pub async fn refresh_all(&self) -> Result<(), EngineError> {
        let (labels, table) = tokio::join!(self.selector.refresh(), self.table.refresh());
        *self.last_refreshed.lock().await = Utc::now();

        if let Err(err) = &labels {
            warn!("Label refresh failed: {err}");
        }
        if let Err(err) = &table {
            warn!("Assignment refresh failed: {err}");
        }
        labels?;
        table?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::models::{Label, LabelAssignment},
        notify::testing::RecordingNotifier,
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingNavigator {
        visited: StdMutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate_to_record(&self, item_id: &str) {
            self.visited.lock().unwrap().push(item_id.to_string());
        }
    }

    struct OneLabel {
        rows: StdMutex<Vec<LabelAssignment>>,
        deleted: StdMutex<bool>,
    }

    #[async_trait]
    impl DataService for OneLabel {
        async fn list_labels(&self) -> Result<Vec<Label>> {
            if *self.deleted.lock().unwrap() {
                return Ok(Vec::new());
            }
            Ok(vec![Label {
                id: "l1".into(),
                name: "Escalations".into(),
                assignment_count: self.rows.lock().unwrap().len() as u64,
                created_at: Utc::now(),
            }])
        }

        async fn list_assignments(&self, label_id: &str) -> Result<Vec<LabelAssignment>> {
            if label_id != "l1" || *self.deleted.lock().unwrap() {
                return Ok(Vec::new());
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn delete_assignment(&self, assignment_id: &str) -> Result<()> {
            self.rows.lock().unwrap().retain(|row| row.id != assignment_id);
            Ok(())
        }

        async fn delete_assignments(&self, assignment_ids: &[String]) -> Result<()> {
            self.rows
                .lock()
                .unwrap()
                .retain(|row| !assignment_ids.contains(&row.id));
            Ok(())
        }

        async fn delete_label(&self, _label_id: &str) -> Result<()> {
            *self.deleted.lock().unwrap() = true;
            Ok(())
        }
    }

    fn viewer() -> (LabelAssignmentViewer, Arc<RecordingNavigator>) {
        let service = Arc::new(OneLabel {
            rows: StdMutex::new(vec![
                LabelAssignment {
                    id: "a1".into(),
                    item_id: "500A".into(),
                    subject_or_name: Some("Printer jam".into()),
                    object_type: Some("Case".into()),
                    object_api_name: Some("Case".into()),
                    ..Default::default()
                },
                LabelAssignment {
                    id: "a2".into(),
                    item_id: "001B".into(),
                    subject_or_name: Some("Acme".into()),
                    object_type: Some("Account".into()),
                    ..Default::default()
                },
            ]),
            deleted: StdMutex::new(false),
        });
        let navigator = Arc::new(RecordingNavigator::default());
        let viewer = LabelAssignmentViewer::new(
            service,
            Arc::new(RecordingNotifier::default()),
            navigator.clone(),
            &TableSettings::default(),
        );
        (viewer, navigator)
    }

    #[tokio::test]
    async fn selecting_a_label_resets_search_and_loads() {
        let (viewer, _) = viewer();
        viewer.selector().refresh().await.unwrap();
        viewer.table().set_search_term("acme").await;

        let outcome = viewer.handle_label_select(Some("l1")).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded(2));
        let snapshot = viewer.table().snapshot().await;
        assert!(!snapshot.is_searching);
        assert_eq!(snapshot.total_count, 2);
    }

    #[tokio::test]
    async fn view_action_navigates_to_item() {
        let (viewer, navigator) = viewer();
        viewer.handle_label_select(Some("l1")).await.unwrap();

        viewer
            .handle_row_action(RowAction::ViewRecord, "a2")
            .await
            .unwrap();
        assert_eq!(*navigator.visited.lock().unwrap(), vec!["001B".to_string()]);

        assert!(viewer
            .handle_row_action(RowAction::ViewRecord, "missing")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn delete_action_goes_through_confirmation() {
        let (viewer, _) = viewer();
        viewer.handle_label_select(Some("l1")).await.unwrap();

        viewer
            .handle_row_action(RowAction::parse("delete").unwrap(), "a1")
            .await
            .unwrap();
        assert_eq!(viewer.table().snapshot().await.total_count, 2);

        viewer.table().confirm_delete().await.unwrap();
        let snapshot = viewer.table().snapshot().await;
        assert_eq!(snapshot.total_count, 1);
        assert_eq!(snapshot.rows[0].id, "a2");
    }

    #[tokio::test]
    async fn deleting_the_label_empties_the_table() {
        let (viewer, _) = viewer();
        viewer.selector().refresh().await.unwrap();
        viewer.handle_label_select(Some("l1")).await.unwrap();

        viewer.selector().request_delete_label().await.unwrap();
        let deleted = viewer.delete_selected_label().await.unwrap();
        assert_eq!(deleted.map(|d| d.label_id), Some("l1".to_string()));

        let snapshot = viewer.table().snapshot().await;
        assert!(snapshot.label_id.is_none());
        assert!(snapshot.rows.is_empty());
        assert!(viewer.selector().state().await.options.is_empty());
    }

    #[tokio::test]
    async fn refresh_all_updates_both_sides() {
        let (viewer, _) = viewer();
        viewer.handle_label_select(Some("l1")).await.unwrap();
        let before = viewer.last_refreshed().await;

        viewer.refresh_all().await.unwrap();
        assert!(viewer.last_refreshed().await >= before);
        assert_eq!(viewer.selector().state().await.options.len(), 1);
        assert_eq!(viewer.table().snapshot().await.total_count, 2);
    }

    #[tokio::test]
    async fn popover_details_for_rows() {
        let (viewer, _) = viewer();
        viewer.handle_label_select(Some("l1")).await.unwrap();

        let detail = viewer.record_detail("a1").await.unwrap();
        assert_eq!(detail.record_id, "500A");
        assert_eq!(detail.icon_symbol(), "case");
        assert!(viewer.record_detail("zzz").await.is_none());
    }

    #[test]
    fn row_action_names() {
        assert_eq!(RowAction::parse("view_record"), Some(RowAction::ViewRecord));
        assert_eq!(RowAction::parse("view"), Some(RowAction::ViewRecord));
        assert_eq!(RowAction::parse("edit"), None);
    }
}

use std::{collections::BTreeSet, sync::Arc};

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::sync::Mutex;

use super::{
    record::AssignmentRecord,
    state::{DeleteTarget, TableSnapshot, TableState},
    view::{SortDirection, SortKey},
};
use crate::{
    errors::{reduce_error, EngineError},
    icons::IconTable,
    notify::Notification,
    service::{DataService, Notifier},
    settings::TableSettings,
};

/// How a `load` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No label: the table was emptied without calling the service.
    Cleared,
    /// The snapshot was replaced with this many records.
    Loaded(usize),
    /// A newer load was issued while this one was in flight; its result was
    /// dropped.
    Superseded,
}

/// The assignment table engine.
///
/// Cloning is cheap and every clone drives the same state. Locks are never
/// held across a call into the data service.
#[derive(Clone)]
pub struct AssignmentTable {
    state: Arc<Mutex<TableState>>,
    service: Arc<dyn DataService>,
    notifier: Arc<dyn Notifier>,
    icons: IconTable,
}

impl AssignmentTable {
    pub fn new(
        service: Arc<dyn DataService>,
        notifier: Arc<dyn Notifier>,
        settings: &TableSettings,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TableState::new(settings))),
            service,
            notifier,
            icons: IconTable::standard(),
        }
    }

    /// Load the assignments of `label_id`, or empty the table for `None`.
    pub async fn load(&self, label_id: Option<&str>) -> Result<LoadOutcome, EngineError> {
        let generation = {
            let mut state = self.state.lock().await;
            state.generation = state.generation.wrapping_add(1);
            state.current_label_id = label_id.map(str::to_string);

            if label_id.is_none() {
                state.clear();
                state.is_loading = false;
                return Ok(LoadOutcome::Cleared);
            }

            state.is_loading = true;
            state.generation
        };

        let Some(label_id) = label_id else {
            return Ok(LoadOutcome::Cleared);
        };

        let result = self.service.list_assignments(label_id).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Dropping stale assignment list for label {label_id}");
            return Ok(LoadOutcome::Superseded);
        }

        let now = Utc::now();
        state.is_loading = false;
        state.last_refreshed_at = Some(now);

        match result {
            Ok(raw) => {
                let count = raw.len();
                state.replace_records(raw, &self.icons, now);
                info!("Loaded {count} assignment(s) for label {label_id}");
                Ok(LoadOutcome::Loaded(count))
            }
            Err(err) => {
                let message = reduce_error(&err);
                error!("Failed to load assignments for label {label_id}: {message}");
                state.fail_load(message.clone());
                Err(EngineError::RemoteList(message))
            }
        }
    }

    /// Reload the label currently on screen.
    pub async fn refresh(&self) -> Result<LoadOutcome, EngineError> {
        let label_id = self.state.lock().await.current_label_id.clone();
        self.load(label_id.as_deref()).await
    }

    pub async fn set_search_term(&self, term: &str) {
        self.state.lock().await.set_search_term(term);
    }

    pub async fn set_sort(&self, key: SortKey, direction: SortDirection) {
        self.state.lock().await.set_sort(key, direction);
    }

    pub async fn toggle_select(&self, id: &str) {
        self.state.lock().await.toggle_select(id);
    }

    pub async fn set_selected(&self, id: &str, selected: bool) {
        self.state.lock().await.set_selected(id, selected);
    }

    pub async fn replace_selection(&self, ids: &[&str]) {
        self.state
            .lock()
            .await
            .replace_selection(ids.iter().copied());
    }

    pub async fn select_all(&self) {
        self.state.lock().await.select_all();
    }

    pub async fn clear_selection(&self) {
        self.state.lock().await.clear_selection();
    }

    pub async fn selection_count(&self) -> usize {
        self.state.lock().await.selection_count()
    }

    pub async fn has_selection(&self) -> bool {
        self.state.lock().await.has_selection()
    }

    pub async fn record(&self, id: &str) -> Option<AssignmentRecord> {
        self.state.lock().await.record(id).cloned()
    }

    pub async fn snapshot(&self) -> TableSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Ask for confirmation before deleting. An empty bulk target is refused.
    pub async fn request_delete(&self, target: DeleteTarget) -> Result<(), EngineError> {
        if target.is_empty() {
            let message = "Select at least one assignment to delete.".to_string();
            self.notifier.notify(Notification::warning(message.clone()));
            return Err(EngineError::Validation(message));
        }

        self.state.lock().await.pending_confirmation = Some(target);
        Ok(())
    }

    /// Confirmation for the rows currently checked.
    pub async fn request_delete_selected(&self) -> Result<(), EngineError> {
        let selected = self.state.lock().await.selected_ids().clone();
        self.request_delete(DeleteTarget::Many(selected)).await
    }

    pub async fn cancel_delete(&self) {
        self.state.lock().await.pending_confirmation = None;
    }

    /// Run the delete waiting for confirmation, if any.
    pub async fn confirm_delete(&self) -> Result<(), EngineError> {
        let pending = self.state.lock().await.pending_confirmation.take();
        match pending {
            Some(DeleteTarget::One(id)) => self.delete_one(&id).await,
            Some(DeleteTarget::Many(ids)) => self.delete_many(ids).await,
            None => {
                debug!("confirm_delete called with nothing pending");
                Ok(())
            }
        }
    }

    pub async fn delete_one(&self, assignment_id: &str) -> Result<(), EngineError> {
        let generation = self
            .begin_delete(DeleteTarget::One(assignment_id.to_string()))
            .await;

        let result = self.service.delete_assignment(assignment_id).await;
        let outcome = match result {
            Ok(()) => {
                info!("Deleted assignment {assignment_id}");
                self.notifier
                    .notify(Notification::success("Assignment deleted successfully."));
                self.reload_after_delete().await;
                Ok(())
            }
            Err(err) => self.fail_delete(&err).await,
        };

        self.finish_delete(generation).await;
        outcome
    }

    /// Delete several assignments in one call. An empty set does nothing.
    pub async fn delete_many(&self, assignment_ids: BTreeSet<String>) -> Result<(), EngineError> {
        if assignment_ids.is_empty() {
            debug!("delete_many called with no ids; nothing to do");
            return Ok(());
        }

        let count = assignment_ids.len();
        let ids: Vec<String> = assignment_ids.iter().cloned().collect();
        let generation = self.begin_delete(DeleteTarget::Many(assignment_ids)).await;

        let result = self.service.delete_assignments(&ids).await;
        let outcome = match result {
            Ok(()) => {
                info!("Deleted {count} assignment(s)");
                let message = if count == 1 {
                    "1 assignment deleted successfully.".to_string()
                } else {
                    format!("{count} assignments deleted successfully.")
                };
                self.notifier.notify(Notification::success(message));
                self.state.lock().await.clear_selection();
                self.reload_after_delete().await;
                Ok(())
            }
            Err(err) => self.fail_delete(&err).await,
        };

        self.finish_delete(generation).await;
        outcome
    }

    async fn begin_delete(&self, target: DeleteTarget) -> u64 {
        let mut state = self.state.lock().await;
        state.is_loading = true;
        state.last_mutation_error = None;
        state.deleting = Some(target);
        state.generation
    }

    /// Any load started since `begin_delete` owns the loading flag.
    async fn finish_delete(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.is_loading = false;
        }
        state.deleting = None;
    }

    async fn fail_delete(&self, err: &anyhow::Error) -> Result<(), EngineError> {
        let message = reduce_error(err);
        error!("Failed to delete assignment(s): {message}");
        self.state.lock().await.last_mutation_error = Some(message.clone());
        self.notifier.notify(Notification::error("Error", message.clone()));
        Err(EngineError::RemoteMutation(message))
    }

    async fn reload_after_delete(&self) {
        // The delete itself went through; a failed reload shows up as `last_error`.
        if let Err(err) = self.refresh().await {
            warn!("Reload after delete failed: {err}");
        }
    }
}

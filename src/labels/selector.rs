use std::sync::Arc;

use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    db::models::Label,
    errors::{reduce_error, EngineError},
    notify::Notification,
    service::{DataService, Notifier},
};

/// One entry of the label picker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelOption {
    pub value: String,
    /// `"{name} ({assignment_count})"`
    pub label: String,
}

impl From<&Label> for LabelOption {
    fn from(label: &Label) -> Self {
        Self {
            value: label.id.clone(),
            label: format!("{} ({})", label.name, label.assignment_count),
        }
    }
}

/// Emitted when the user picks a label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelection {
    pub label_id: Option<String>,
    pub label_name: String,
}

/// Emitted after a label and its assignments are gone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelDeleted {
    pub label_id: String,
    pub label_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectorState {
    pub options: Vec<LabelOption>,
    pub selected_label_id: Option<String>,
    pub error: Option<String>,
    pub is_loading: bool,
    pub is_delete_modal_open: bool,
    #[serde(skip)]
    generation: u64,
}

impl SelectorState {
    pub fn current_label_name(&self) -> String {
        self.selected_label_id
            .as_deref()
            .and_then(|id| self.options.iter().find(|option| option.value == id))
            .map(|option| option.label.clone())
            .unwrap_or_default()
    }

    pub fn no_label_selected(&self) -> bool {
        self.selected_label_id.is_none()
    }
}

/// Lists labels, tracks the chosen one and runs the delete-label flow.
#[derive(Clone)]
pub struct LabelSelector {
    state: Arc<Mutex<SelectorState>>,
    service: Arc<dyn DataService>,
    notifier: Arc<dyn Notifier>,
}

impl LabelSelector {
    pub fn new(service: Arc<dyn DataService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SelectorState {
                is_loading: true,
                ..SelectorState::default()
            })),
            service,
            notifier,
        }
    }

    pub async fn state(&self) -> SelectorState {
        self.state.lock().await.clone()
    }

    /// Re-list labels. Results of an older, slower call are discarded.
    pub async fn refresh(&self) -> Result<usize, EngineError> {
        let generation = {
            let mut state = self.state.lock().await;
            state.generation = state.generation.wrapping_add(1);
            state.is_loading = true;
            state.generation
        };

        let result = self.service.list_labels().await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            return Ok(state.options.len());
        }
        state.is_loading = false;

        match result {
            Ok(labels) => {
                state.options = labels.iter().map(LabelOption::from).collect();
                state.error = None;
                if let Some(selected) = state.selected_label_id.clone() {
                    if !state.options.iter().any(|option| option.value == selected) {
                        state.selected_label_id = None;
                    }
                }
                Ok(state.options.len())
            }
            Err(err) => {
                let message = format!("Error loading labels: {}", reduce_error(&err));
                error!("{message}");
                state.options.clear();
                state.error = Some(message.clone());
                Err(EngineError::RemoteList(message))
            }
        }
    }

    pub async fn select(&self, label_id: Option<&str>) -> LabelSelection {
        let mut state = self.state.lock().await;
        state.selected_label_id = label_id.map(str::to_string);
        LabelSelection {
            label_id: state.selected_label_id.clone(),
            label_name: state.current_label_name(),
        }
    }

    /// Open the delete-label confirmation. Warns when nothing is selected.
    pub async fn request_delete_label(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        if state.no_label_selected() {
            let message = "Please select a label to delete";
            self.notifier.notify(Notification::warning(message));
            return Err(EngineError::Validation(message.to_string()));
        }
        state.is_delete_modal_open = true;
        Ok(())
    }

    pub async fn cancel_delete_label(&self) {
        self.state.lock().await.is_delete_modal_open = false;
    }

    /// Delete the selected label and all of its assignments.
    ///
    /// Returns `Ok(None)` when there was nothing to delete.
    pub async fn confirm_delete_label(&self) -> Result<Option<LabelDeleted>, EngineError> {
        let (label_id, label_name) = {
            let mut state = self.state.lock().await;
            state.is_delete_modal_open = false;
            let Some(label_id) = state.selected_label_id.clone() else {
                return Ok(None);
            };
            state.is_loading = true;
            (label_id, state.current_label_name())
        };

        match self.service.delete_label(&label_id).await {
            Ok(()) => {
                info!("Deleted label {label_id} with all assignments");
                self.notifier.notify(Notification::success(format!(
                    "Label \"{label_name}\" was deleted with all its assignments"
                )));
                self.state.lock().await.selected_label_id = None;
                if let Err(err) = self.refresh().await {
                    error!("Failed to refresh labels after delete: {err}");
                }
                Ok(Some(LabelDeleted {
                    label_id,
                    label_name,
                }))
            }
            Err(err) => {
                let message = reduce_error(&err);
                error!("Failed to delete label {label_id}: {message}");
                self.notifier
                    .notify(Notification::error("Error deleting label", message.clone()));
                self.state.lock().await.is_loading = false;
                Err(EngineError::RemoteMutation(message))
            }
        }
    }
}

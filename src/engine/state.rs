//! Synchronous table state: the authoritative snapshot, the derived view and
//! the selection. Every async concern lives in the controller; everything here
//! is a plain state transition that can be tested without a runtime.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::AssignmentRecord;
use super::view::{matches_search, sort_indices, SortDirection, SortKey};
use crate::db::models::LabelAssignment;
use crate::icons::IconTable;
use crate::settings::TableSettings;

/// What a pending or running delete applies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind", content = "ids")]
pub enum DeleteTarget {
    One(String),
    Many(BTreeSet<String>),
}

impl DeleteTarget {
    pub fn len(&self) -> usize {
        match self {
            DeleteTarget::One(_) => 1,
            DeleteTarget::Many(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which of the mutually exclusive table regions a host should show.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DisplayState {
    NoLabel,
    Loading,
    Error,
    Empty,
    Table,
}

#[derive(Debug, Clone)]
pub struct TableState {
    pub(crate) records: Vec<AssignmentRecord>,
    /// Indices into `records`, sorted then filtered.
    view: Vec<usize>,
    search_term: String,
    sort_key: SortKey,
    sort_direction: SortDirection,
    selected_ids: BTreeSet<String>,
    page_size: usize,
    pub(crate) is_loading: bool,
    pub(crate) last_error: Option<String>,
    pub(crate) last_mutation_error: Option<String>,
    pub(crate) last_refreshed_at: Option<DateTime<Utc>>,
    pub(crate) current_label_id: Option<String>,
    pub(crate) pending_confirmation: Option<DeleteTarget>,
    pub(crate) deleting: Option<DeleteTarget>,
    /// Tag of the newest load request; older completions are dropped.
    pub(crate) generation: u64,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(&TableSettings::default())
    }
}

impl TableState {
    pub fn new(settings: &TableSettings) -> Self {
        Self {
            records: Vec::new(),
            view: Vec::new(),
            search_term: String::new(),
            sort_key: settings.sort_key.clone(),
            sort_direction: settings.sort_direction,
            selected_ids: BTreeSet::new(),
            page_size: settings.page_size.max(1),
            is_loading: false,
            last_error: None,
            last_mutation_error: None,
            last_refreshed_at: None,
            current_label_id: None,
            pending_confirmation: None,
            deleting: None,
            generation: 0,
        }
    }

    /// Replace the snapshot wholesale with freshly listed records.
    pub fn replace_records(
        &mut self,
        raw: Vec<LabelAssignment>,
        icons: &IconTable,
        now: DateTime<Utc>,
    ) {
        self.records = raw
            .into_iter()
            .map(|record| AssignmentRecord::from_remote(record, icons, now))
            .collect();
        self.selected_ids.clear();
        self.last_error = None;
        self.recompute();
    }

    /// "No label selected": empty table, nothing selected, no error.
    pub fn clear(&mut self) {
        self.records.clear();
        self.view.clear();
        self.selected_ids.clear();
        self.last_error = None;
    }

    /// A list failure blanks the table. The selection is left alone.
    pub fn fail_load(&mut self, message: String) {
        self.records.clear();
        self.view.clear();
        self.last_error = Some(message);
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_lowercase();
        self.recompute();
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort_key = key;
        self.sort_direction = direction;
        self.recompute();
    }

    fn recompute(&mut self) {
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        sort_indices(&self.records, &mut order, &self.sort_key, self.sort_direction);

        if !self.search_term.is_empty() {
            let needle = self.search_term.as_str();
            order.retain(|&i| matches_search(&self.records[i], needle));
        }

        self.view = order;
    }

    pub fn filtered_sorted(&self) -> impl Iterator<Item = &AssignmentRecord> + '_ {
        self.view.iter().map(|&i| &self.records[i])
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &AssignmentRecord> + '_ {
        self.filtered_sorted().take(self.page_size)
    }

    pub fn records(&self) -> &[AssignmentRecord] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&AssignmentRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort(&self) -> (&SortKey, SortDirection) {
        (&self.sort_key, self.sort_direction)
    }

    pub fn total_count(&self) -> usize {
        self.view.len()
    }

    pub fn visible_count(&self) -> usize {
        self.page_size.min(self.view.len())
    }

    pub fn has_more_rows(&self) -> bool {
        self.view.len() > self.page_size
    }

    fn in_view(&self, id: &str) -> bool {
        self.view.iter().any(|&i| self.records[i].id == id)
    }

    pub fn toggle_select(&mut self, id: &str) {
        let selected = self.selected_ids.contains(id);
        self.set_selected(id, !selected);
    }

    /// Ids outside the current view are ignored.
    pub fn set_selected(&mut self, id: &str, selected: bool) {
        if !self.in_view(id) {
            return;
        }
        if selected {
            self.selected_ids.insert(id.to_string());
        } else {
            self.selected_ids.remove(id);
        }
    }

    /// Replace the selection with whatever the host reports as checked.
    pub fn replace_selection<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let selected: BTreeSet<String> = ids
            .into_iter()
            .filter(|id| self.in_view(id))
            .map(str::to_string)
            .collect();
        self.selected_ids = selected;
    }

    pub fn select_all(&mut self) {
        self.selected_ids = self.filtered_sorted().map(|r| r.id.clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
    }

    pub fn selected_ids(&self) -> &BTreeSet<String> {
        &self.selected_ids
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.contains(id)
    }

    pub fn selection_count(&self) -> usize {
        self.selected_ids.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_ids.is_empty()
    }

    pub fn display_state(&self) -> DisplayState {
        if self.current_label_id.is_none() {
            DisplayState::NoLabel
        } else if self.is_loading {
            DisplayState::Loading
        } else if self.last_error.is_some() {
            DisplayState::Error
        } else if self.view.is_empty() {
            DisplayState::Empty
        } else {
            DisplayState::Table
        }
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let total = self.total_count();
        let selected = self.selection_count();

        TableSnapshot {
            label_id: self.current_label_id.clone(),
            rows: self.visible_rows().cloned().collect(),
            search_term: self.search_term.clone(),
            sort_key: self.sort_key.clone(),
            sort_direction: self.sort_direction,
            selected_ids: self.selected_ids.iter().cloned().collect(),
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
            last_mutation_error: self.last_mutation_error.clone(),
            last_refreshed_at: self.last_refreshed_at,
            selection_count: selected,
            has_selection: selected > 0,
            visible_count: self.visible_count(),
            total_count: total,
            has_more_rows: self.has_more_rows(),
            is_searching: !self.search_term.is_empty(),
            pending_confirmation: self.pending_confirmation.clone(),
            display_state: self.display_state(),
            record_count_text: record_count_text(total),
            delete_button_label: delete_button_label(selected),
        }
    }
}

/// Everything a host needs to render the table, detached from the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub label_id: Option<String>,
    pub rows: Vec<AssignmentRecord>,
    pub search_term: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub selected_ids: Vec<String>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub last_mutation_error: Option<String>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
    pub selection_count: usize,
    pub has_selection: bool,
    pub visible_count: usize,
    pub total_count: usize,
    pub has_more_rows: bool,
    pub is_searching: bool,
    pub pending_confirmation: Option<DeleteTarget>,
    pub display_state: DisplayState,
    pub record_count_text: String,
    pub delete_button_label: String,
}

fn record_count_text(count: usize) -> String {
    format!("{count} record{}", if count == 1 { "" } else { "s" })
}

fn delete_button_label(selected: usize) -> String {
    match selected {
        0 => "Delete Selected".to_string(),
        n => format!("Delete ({n})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::record::tests::record;

    fn raw(id: &str, name: &str, object_type: &str) -> LabelAssignment {
        LabelAssignment {
            id: id.into(),
            item_id: format!("item-{id}"),
            subject_or_name: Some(name.into()),
            object_type: Some(object_type.into()),
            object_api_name: Some(object_type.into()),
            ..Default::default()
        }
    }

    fn loaded(rows: Vec<LabelAssignment>) -> TableState {
        let mut state = TableState::default();
        state.current_label_id = Some("label-1".into());
        state.replace_records(rows, &IconTable::standard(), Utc::now());
        state
    }

    fn ids(state: &TableState) -> Vec<String> {
        state.filtered_sorted().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn default_sort_is_name_ascending() {
        let state = loaded(vec![raw("1", "Beta", "Account"), raw("2", "alpha", "Account")]);
        assert_eq!(ids(&state), vec!["2", "1"]);
    }

    #[test]
    fn empty_search_returns_full_sorted_set() {
        let mut state = loaded(vec![
            raw("1", "Gamma", "Lead"),
            raw("2", "alpha", "Case"),
            raw("3", "Beta", "Account"),
        ]);
        let before = ids(&state);

        state.set_search_term("beta");
        assert_eq!(ids(&state), vec!["3"]);

        state.set_search_term("");
        assert_eq!(ids(&state), before);
    }

    #[test]
    fn search_for_case_finds_only_the_case() {
        let mut state = loaded(vec![
            raw("1", "Acme Corp", "Account"),
            raw("2", "Printer on fire", "Case"),
            raw("3", "Jane Doe", "Contact"),
        ]);
        state.set_search_term("case");
        assert_eq!(ids(&state), vec!["2"]);
    }

    #[test]
    fn unmatched_search_is_empty_not_an_error() {
        let mut state = loaded(vec![raw("1", "Acme", "Account")]);
        state.set_search_term("zzz");
        assert_eq!(state.total_count(), 0);
        assert_eq!(state.display_state(), DisplayState::Empty);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn search_term_is_case_insensitive() {
        let mut state = loaded(vec![raw("1", "Acme", "Account")]);
        state.set_search_term("ACME");
        assert_eq!(ids(&state), vec!["1"]);
        assert_eq!(state.search_term(), "acme");
    }

    #[test]
    fn search_term_whitespace_is_matched_as_typed() {
        let mut state = loaded(vec![
            raw("1", "Acme Corp", "Account"),
            raw("2", "AcmeCorp", "Account"),
        ]);
        state.set_search_term("acme ");
        assert_eq!(ids(&state), vec!["1"]);
        assert_eq!(state.search_term(), "acme ");

        state.set_search_term("   ");
        assert_eq!(state.total_count(), 0);
        assert!(state.snapshot().is_searching);
    }

    #[test]
    fn select_all_covers_filtered_view_only() {
        let mut state = loaded(vec![
            raw("1", "Acme", "Account"),
            raw("2", "Broken", "Case"),
            raw("3", "Acme West", "Account"),
        ]);
        state.set_search_term("acme");
        state.select_all();

        assert_eq!(state.selection_count(), 2);
        assert!(state.is_selected("1"));
        assert!(state.is_selected("3"));
        assert!(!state.is_selected("2"));

        state.clear_selection();
        assert_eq!(state.selection_count(), 0);
        assert!(!state.has_selection());
    }

    #[test]
    fn selecting_outside_the_view_is_a_no_op() {
        let mut state = loaded(vec![raw("1", "Acme", "Account"), raw("2", "Other", "Lead")]);
        state.set_search_term("acme");

        state.set_selected("2", true);
        state.toggle_select("missing");
        assert_eq!(state.selection_count(), 0);

        state.toggle_select("1");
        assert!(state.is_selected("1"));
        state.toggle_select("1");
        assert!(!state.is_selected("1"));
    }

    #[test]
    fn replace_selection_drops_unknown_ids() {
        let mut state = loaded(vec![raw("1", "Acme", "Account"), raw("2", "Other", "Lead")]);
        state.replace_selection(["1", "2", "ghost"]);
        assert_eq!(
            state.selected_ids().iter().cloned().collect::<Vec<_>>(),
            vec!["1", "2"]
        );
    }

    #[test]
    fn reload_clears_selection() {
        let mut state = loaded(vec![raw("1", "Acme", "Account")]);
        state.select_all();
        assert!(state.has_selection());

        state.replace_records(vec![raw("1", "Acme", "Account")], &IconTable::standard(), Utc::now());
        assert_eq!(state.selection_count(), 0);
    }

    #[test]
    fn failed_load_blanks_table_but_keeps_selection() {
        let mut state = loaded(vec![raw("1", "Acme", "Account")]);
        state.select_all();

        state.fail_load("boom".into());
        assert!(state.records().is_empty());
        assert_eq!(state.total_count(), 0);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
        assert_eq!(state.selection_count(), 1);
        assert_eq!(state.display_state(), DisplayState::Error);
    }

    #[test]
    fn pagination_caps_visible_rows() {
        let settings = TableSettings {
            page_size: 2,
            ..TableSettings::default()
        };
        let mut state = TableState::new(&settings);
        state.current_label_id = Some("l".into());
        state.replace_records(
            vec![raw("1", "a", "Case"), raw("2", "b", "Case"), raw("3", "c", "Case")],
            &IconTable::standard(),
            Utc::now(),
        );

        assert_eq!(state.total_count(), 3);
        assert_eq!(state.visible_count(), 2);
        assert!(state.has_more_rows());

        let snapshot = state.snapshot();
        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.record_count_text, "3 records");
    }

    #[test]
    fn sort_change_recomputes_view() {
        let mut state = loaded(vec![raw("1", "a", "Lead"), raw("2", "b", "Account")]);
        state.set_sort(SortKey::ObjectType, SortDirection::Ascending);
        assert_eq!(ids(&state), vec!["2", "1"]);
        state.set_sort(SortKey::ObjectType, SortDirection::Descending);
        assert_eq!(ids(&state), vec!["1", "2"]);
    }

    #[test]
    fn snapshot_labels_follow_selection() {
        let mut state = loaded(vec![raw("1", "a", "Lead"), raw("2", "b", "Account")]);
        assert_eq!(state.snapshot().delete_button_label, "Delete Selected");
        state.set_selected("1", true);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.delete_button_label, "Delete (1)");
        assert!(snapshot.has_selection);
        assert_eq!(snapshot.display_state, DisplayState::Table);
    }

    #[test]
    fn clear_is_the_no_label_state() {
        let mut state = loaded(vec![raw("1", "a", "Lead")]);
        state.select_all();
        state.current_label_id = None;
        state.clear();
        assert!(state.records().is_empty());
        assert_eq!(state.selection_count(), 0);
        assert!(state.last_error.is_none());
        assert_eq!(state.display_state(), DisplayState::NoLabel);
    }

    #[test]
    fn record_lookup_uses_assignment_id() {
        let state = loaded(vec![raw("1", "a", "Lead")]);
        assert!(state.record("1").is_some());
        assert!(state.record("item-1").is_none());
        assert_eq!(record("9", "x", "Lead").item_id, "item-9");
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::LabelAssignment;
use crate::icons::IconTable;
use crate::service::record_url;

/// Schema name assumed when the service does not report one.
pub const DEFAULT_OBJECT_API_NAME: &str = "Custom__c";

const CASE_OBJECT: &str = "Case";

/// One row of the assignment table.
///
/// Built once from a [`LabelAssignment`] with every default applied, so the
/// rest of the engine never has to deal with partially filled records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: String,
    pub item_id: String,
    pub subject_or_name: Option<String>,
    pub object_type: Option<String>,
    pub object_api_name: String,
    pub icon_name: String,
    pub assigned_date: DateTime<Utc>,
    pub details: BTreeMap<String, String>,
    pub record_url: String,
    /// Case records are also searchable by their case fields.
    pub is_case: bool,
}

impl AssignmentRecord {
    /// Normalize a service record. `now` stands in for a missing assignment date.
    pub fn from_remote(raw: LabelAssignment, icons: &IconTable, now: DateTime<Utc>) -> Self {
        let api_name = raw.object_api_name.filter(|name| !name.is_empty());
        let object_type = raw.object_type.filter(|name| !name.is_empty());

        let icon_name = match raw.icon_name.filter(|icon| !icon.is_empty()) {
            Some(icon) => icon,
            None => icons
                .resolve([api_name.as_deref(), object_type.as_deref()])
                .to_string(),
        };

        let is_case = api_name.as_deref() == Some(CASE_OBJECT)
            || (api_name.is_none() && object_type.as_deref() == Some(CASE_OBJECT));

        Self {
            record_url: record_url(&raw.item_id),
            id: raw.id,
            item_id: raw.item_id,
            subject_or_name: raw.subject_or_name,
            object_type,
            object_api_name: api_name.unwrap_or_else(|| DEFAULT_OBJECT_API_NAME.to_string()),
            icon_name,
            assigned_date: raw.label_assigned_date.unwrap_or(now),
            details: raw.record_details.unwrap_or_default(),
            is_case,
        }
    }

    pub fn display_name(&self) -> &str {
        self.subject_or_name.as_deref().unwrap_or("")
    }
}

//! Assignment data models as they come back from the data service.
//!
//! Everything except the two identifiers is optional here. Defaults are filled
//! in once, when the engine ingests the record (see
//! [`crate::engine::AssignmentRecord::from_remote`]).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Association between a label and one business record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LabelAssignment {
    pub id: String,
    pub item_id: String,
    pub subject_or_name: Option<String>,
    pub object_type: Option<String>,
    pub object_api_name: Option<String>,
    pub icon_name: Option<String>,
    pub label_assigned_date: Option<DateTime<Utc>>,
    pub record_details: Option<BTreeMap<String, String>>,
}

/// Input for linking a record to a label.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub item_id: String,
    pub subject_or_name: String,
    pub object_type: String,
    pub object_api_name: Option<String>,
    #[serde(default)]
    pub record_details: BTreeMap<String, String>,
}

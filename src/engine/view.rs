//! Sorting and search filtering over assignment records.
//!
//! The comparator mirrors how the table has always behaved: values are
//! compared as lowercase strings whenever either side is text, a missing value
//! counts as the empty string, and descending order is the ascending result
//! negated. Sorting is stable, so ties keep their incoming order in both
//! directions.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::record::AssignmentRecord;

/// Extra `details` fields searched when a record is case-like.
pub const CASE_SEARCH_FIELDS: &[&str] = &["CaseNumber", "Subject", "Status", "Priority"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Ascending
    }
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Column a table can be sorted by. Names the host does not know about are
/// looked up in the record's detail fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    SubjectOrName,
    ObjectType,
    ObjectApiName,
    AssignedDate,
    ItemId,
    Id,
    Detail(String),
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::SubjectOrName
    }
}

impl SortKey {
    pub fn from_field_name(field: &str) -> Self {
        match field {
            // The record link column displays the name, so it sorts by it.
            "SubjectOrName" | "subjectOrName" | "recordUrl" | "name" => SortKey::SubjectOrName,
            "ObjectType" | "objectType" | "type" => SortKey::ObjectType,
            "ObjectApiName" | "objectApiName" => SortKey::ObjectApiName,
            "LabelAssignedDate" | "assignedDate" | "date" => SortKey::AssignedDate,
            "ItemId" | "itemId" => SortKey::ItemId,
            "Id" | "id" => SortKey::Id,
            other => SortKey::Detail(other.to_string()),
        }
    }

    pub fn field_name(&self) -> &str {
        match self {
            SortKey::SubjectOrName => "SubjectOrName",
            SortKey::ObjectType => "ObjectType",
            SortKey::ObjectApiName => "ObjectApiName",
            SortKey::AssignedDate => "LabelAssignedDate",
            SortKey::ItemId => "ItemId",
            SortKey::Id => "Id",
            SortKey::Detail(name) => name,
        }
    }

    fn value<'a>(&self, record: &'a AssignmentRecord) -> SortValue<'a> {
        let text = |value: Option<&'a str>| match value {
            Some(v) if !v.is_empty() => SortValue::Text(v),
            _ => SortValue::Missing,
        };

        match self {
            SortKey::SubjectOrName => text(record.subject_or_name.as_deref()),
            SortKey::ObjectType => text(record.object_type.as_deref()),
            SortKey::ObjectApiName => text(Some(record.object_api_name.as_str())),
            SortKey::AssignedDate => SortValue::Time(record.assigned_date),
            SortKey::ItemId => text(Some(record.item_id.as_str())),
            SortKey::Id => text(Some(record.id.as_str())),
            SortKey::Detail(name) => text(record.details.get(name).map(String::as_str)),
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        SortKey::from_field_name(&value)
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.field_name().to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, Copy)]
enum SortValue<'a> {
    Missing,
    Text(&'a str),
    Time(DateTime<Utc>),
}

impl SortValue<'_> {
    fn as_lower_string(&self) -> String {
        match self {
            SortValue::Missing => String::new(),
            SortValue::Text(text) => text.to_lowercase(),
            SortValue::Time(ts) => ts.to_rfc3339_opts(SecondsFormat::Millis, true).to_lowercase(),
        }
    }
}

fn compare_values(a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Time(x), SortValue::Time(y)) => x.cmp(&y),
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
        (SortValue::Missing, SortValue::Time(_)) => Ordering::Less,
        (SortValue::Time(_), SortValue::Missing) => Ordering::Greater,
        (a, b) => a.as_lower_string().cmp(&b.as_lower_string()),
    }
}

pub fn compare_records(
    a: &AssignmentRecord,
    b: &AssignmentRecord,
    key: &SortKey,
    direction: SortDirection,
) -> Ordering {
    direction.apply(compare_values(key.value(a), key.value(b)))
}

/// Stable sort of `order` (indices into `records`).
pub fn sort_indices(
    records: &[AssignmentRecord],
    order: &mut [usize],
    key: &SortKey,
    direction: SortDirection,
) {
    order.sort_by(|&a, &b| compare_records(&records[a], &records[b], key, direction));
}

/// `needle` must already be lowercase and non-empty.
pub fn matches_search(record: &AssignmentRecord, needle: &str) -> bool {
    let contains = |value: Option<&str>| {
        value
            .map(|v| v.to_lowercase().contains(needle))
            .unwrap_or(false)
    };

    if contains(record.subject_or_name.as_deref()) || contains(record.object_type.as_deref()) {
        return true;
    }

    record.is_case
        && CASE_SEARCH_FIELDS
            .iter()
            .any(|field| contains(record.details.get(*field).map(String::as_str)))
}

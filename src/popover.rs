//! Read-only detail card for a hovered assignment.

use serde::{Deserialize, Serialize};

use crate::engine::AssignmentRecord;

const FALLBACK_CATEGORY: &str = "standard";
const FALLBACK_SYMBOL: &str = "custom";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetailField {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordDetail {
    pub record_id: String,
    pub record_type: String,
    pub record_name: String,
    pub icon_name: String,
    pub fields: Vec<DetailField>,
}

impl From<&AssignmentRecord> for RecordDetail {
    fn from(record: &AssignmentRecord) -> Self {
        Self {
            record_id: record.item_id.clone(),
            record_type: record
                .object_type
                .clone()
                .unwrap_or_else(|| record.object_api_name.clone()),
            record_name: record.display_name().to_string(),
            icon_name: record.icon_name.clone(),
            fields: record
                .details
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(label, value)| DetailField {
                    label: label.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

impl RecordDetail {
    /// `category:symbol` split of the icon name, with a fallback for anything
    /// that does not have exactly two parts.
    fn icon_parts(&self) -> (&str, &str) {
        let mut parts = self.icon_name.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(category), Some(symbol), None) if !category.is_empty() && !symbol.is_empty() => {
                (category, symbol)
            }
            _ => (FALLBACK_CATEGORY, FALLBACK_SYMBOL),
        }
    }

    pub fn icon_category(&self) -> &str {
        self.icon_parts().0
    }

    pub fn icon_symbol(&self) -> &str {
        self.icon_parts().1
    }

    pub fn svg_url(&self) -> String {
        let (category, symbol) = self.icon_parts();
        format!("/assets/icons/{category}-sprite/svg/symbols.svg#{symbol}")
    }
}

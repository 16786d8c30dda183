//! Label-related data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tag that can be applied to any number of business records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: String,
    pub name: String,
    /// Denormalized; may lag behind the real number of assignments.
    #[serde(default)]
    pub assignment_count: u64,
    pub created_at: DateTime<Utc>,
}

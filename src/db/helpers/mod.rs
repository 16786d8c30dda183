use std::collections::BTreeMap;
use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

/// Record details are stored as a JSON object of display strings.
pub fn parse_details(value: Option<String>) -> Result<Option<BTreeMap<String, String>>> {
    match value {
        Some(raw) if !raw.is_empty() => serde_json::from_str(&raw)
            .map(Some)
            .context("failed to parse record_details"),
        _ => Ok(None),
    }
}

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::engine::{SortDirection, SortKey};

pub const DEFAULT_PAGE_SIZE: usize = 50;
const PAGE_SIZE_ENV: &str = "LABELKIT_PAGE_SIZE";

/// How the assignment table starts out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TableSettings {
    /// Rendering cap; rows beyond it are counted but not shown.
    pub page_size: usize,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort_key: SortKey::SubjectOrName,
            sort_direction: SortDirection::Ascending,
        }
    }
}

impl TableSettings {
    /// Apply `LABELKIT_PAGE_SIZE` when it holds a positive integer.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(raw) = std::env::var(PAGE_SIZE_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => self.page_size = size,
                _ => warn!("Ignoring {PAGE_SIZE_ENV}={raw}: expected a positive integer"),
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UserSettings {
    #[serde(default)]
    table: TableSettings,
}

/// Settings file read once at startup.
pub struct SettingsStore {
    path: PathBuf,
    data: UserSettings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Settings at {} are unreadable ({err}); using defaults", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> TableSettings {
        self.data.table.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.table(), TableSettings::default());
    }

    #[test]
    fn saved_sort_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "table": { "pageSize": 100, "sortKey": "LabelAssignedDate", "sortDirection": "desc" } }"#,
        )
        .unwrap();

        let table = SettingsStore::new(path).unwrap().table();
        assert_eq!(table.page_size, 100);
        assert_eq!(table.sort_key, SortKey::AssignedDate);
        assert_eq!(table.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn partial_and_corrupt_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{ "table": { "pageSize": 75 } }"#).unwrap();
        let table = SettingsStore::new(path.clone()).unwrap().table();
        assert_eq!(table.page_size, 75);
        assert_eq!(table.sort_key, SortKey::SubjectOrName);

        fs::write(&path, "not json").unwrap();
        assert_eq!(
            SettingsStore::new(path).unwrap().table(),
            TableSettings::default()
        );
    }

    #[test]
    fn sort_settings_use_field_names_on_disk() {
        let json = serde_json::to_value(TableSettings::default()).unwrap();
        assert_eq!(json["sortKey"], "SubjectOrName");
        assert_eq!(json["sortDirection"], "ascending");
    }
}

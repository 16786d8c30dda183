mod cli;
pub mod db;
pub mod engine;
pub mod errors;
pub mod icons;
pub mod labels;
pub mod notify;
pub mod popover;
pub mod service;
pub mod settings;
pub mod viewer;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use db::Database;
use notify::LogNotifier;
use service::LogNavigator;
use settings::SettingsStore;
use viewer::LabelAssignmentViewer;

pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) viewer: LabelAssignmentViewer,
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let Cli { db: db_path, command } = Cli::parse();

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        let database = Database::new(db_path.clone())?;

        let settings_path = db_path.with_file_name("labelkit-settings.json");
        let store = SettingsStore::new(settings_path)?;
        log::debug!("Table settings from {}", store.path().display());
        let settings = store.table().with_env_overrides();

        let viewer = LabelAssignmentViewer::new(
            Arc::new(database.clone()),
            Arc::new(LogNotifier),
            Arc::new(LogNavigator),
            &settings,
        );

        let state = AppState {
            db: database,
            viewer,
        };
        cli::execute(&state, command).await
    })
}

// Command-line host for the assignment table.
//
// Every subcommand drives the same viewer a UI would: load, filter, confirm,
// delete. Store-only commands (create-label, assign) go straight to the database.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{
    db::NewAssignment,
    engine::{DeleteTarget, SortDirection, SortKey, TableSnapshot},
    AppState,
};

pub const DEFAULT_DB_FILE: &str = "labelkit.sqlite3";

/// labelkit - browse and prune label assignments
#[derive(Parser, Debug)]
#[command(name = "labelkit")]
#[command(version)]
#[command(about = "Browse and prune label assignments", long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "LABELKIT_DB", default_value = DEFAULT_DB_FILE)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List labels with assignment counts
    Labels,

    /// Show the assignments of a label
    Show {
        label_id: String,

        /// Case-insensitive filter on name and type
        #[arg(long)]
        search: Option<String>,

        /// Column to sort by (SubjectOrName, ObjectType, LabelAssignedDate, or a detail field)
        #[arg(long, value_parser = parse_sort_key)]
        sort: Option<SortKey>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Delete assignments from a label
    Remove {
        label_id: String,

        #[arg(required = true)]
        assignment_ids: Vec<String>,
    },

    /// Create an empty label
    CreateLabel { name: String },

    /// Assign a record to a label
    Assign {
        label_id: String,
        item_id: String,
        name: String,
        object_type: String,

        /// Schema name of the record's object, if it differs from the type
        #[arg(long)]
        api_name: Option<String>,
    },

    /// Delete a label and all its assignments
    DeleteLabel { label_id: String },
}

fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    Ok(SortKey::from_field_name(value))
}

fn new_assignment(
    item_id: String,
    name: String,
    object_type: String,
    api_name: Option<String>,
) -> NewAssignment {
    NewAssignment {
        item_id,
        subject_or_name: name,
        object_api_name: Some(api_name.unwrap_or_else(|| object_type.clone())),
        object_type,
        ..Default::default()
    }
}

fn print_table(snapshot: &TableSnapshot) {
    if let Some(error) = &snapshot.last_error {
        println!("error: {error}");
        return;
    }

    for row in &snapshot.rows {
        println!(
            "{}\t{}\t{}\t{}",
            row.id,
            row.display_name(),
            row.object_type.as_deref().unwrap_or(&row.object_api_name),
            row.assigned_date.format("%Y-%m-%d %H:%M"),
        );
    }
    println!(
        "{} of {} ({})",
        snapshot.visible_count, snapshot.total_count, snapshot.record_count_text
    );
}

pub(crate) async fn execute(state: &AppState, command: Commands) -> Result<()> {
    let viewer = &state.viewer;

    match command {
        Commands::Labels => {
            viewer.selector().refresh().await?;
            for option in viewer.selector().state().await.options {
                println!("{}\t{}", option.value, option.label);
            }
        }
        Commands::Show {
            label_id,
            search,
            sort,
            desc,
        } => {
            let table = viewer.table();
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            match sort {
                Some(key) => table.set_sort(key, direction).await,
                None if desc => {
                    let key = table.snapshot().await.sort_key;
                    table.set_sort(key, direction).await;
                }
                None => {}
            }
            viewer.handle_label_select(Some(&label_id)).await?;
            if let Some(term) = search {
                table.set_search_term(&term).await;
            }
            print_table(&table.snapshot().await);
        }
        Commands::Remove {
            label_id,
            assignment_ids,
        } => {
            let table = viewer.table();
            table.load(Some(&label_id)).await?;
            let target = if assignment_ids.len() == 1 {
                DeleteTarget::One(assignment_ids[0].clone())
            } else {
                DeleteTarget::Many(assignment_ids.into_iter().collect())
            };
            table.request_delete(target).await?;
            table.confirm_delete().await?;
            print_table(&table.snapshot().await);
        }
        Commands::CreateLabel { name } => {
            let label = state.db.create_label(name).await?;
            println!("{}\t{}", label.id, label.name);
        }
        Commands::Assign {
            label_id,
            item_id,
            name,
            object_type,
            api_name,
        } => {
            let input = new_assignment(item_id, name, object_type, api_name);
            let id = state.db.assign(&label_id, input).await?;
            println!("{id}");
        }
        Commands::DeleteLabel { label_id } => {
            viewer.selector().refresh().await?;
            viewer.handle_label_select(Some(&label_id)).await?;
            viewer.selector().request_delete_label().await?;
            viewer.delete_selected_label().await?;
        }
    }

    Ok(())
}

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, to_u64},
    models::Label,
};

const LABEL_COLUMNS: &str = "id, name, total_assignments, created_at";

fn row_to_label(row: &Row) -> Result<Label> {
    let created_at: String = row.get("created_at")?;
    let total: i64 = row.get("total_assignments")?;

    Ok(Label {
        id: row.get("id")?,
        name: row.get("name")?,
        assignment_count: to_u64(total, "total_assignments")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Create a new label. Names must be unique and non-blank.
    pub async fn create_label(&self, name: String) -> Result<Label> {
        self.execute(move |conn| {
            let name = name.trim().to_string();
            if name.is_empty() {
                bail!("Label name must not be empty");
            }

            let existing: i64 = conn.query_row(
                "SELECT COUNT(*) FROM labels WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            if existing > 0 {
                bail!("A label named \"{}\" already exists", name);
            }

            let id = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO labels (id, name, total_assignments, created_at)
                 VALUES (?1, ?2, 0, ?3)",
                params![id, name, Utc::now().to_rfc3339()],
            )
            .context("failed to insert label")?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {LABEL_COLUMNS} FROM labels WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![id])?;
            match rows.next()? {
                Some(row) => row_to_label(row),
                None => Err(anyhow!("Label not found after insert")),
            }
        })
        .await
    }

    /// All labels, ordered by name
    pub async fn get_labels(&self) -> Result<Vec<Label>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LABEL_COLUMNS} FROM labels ORDER BY name COLLATE NOCASE ASC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut labels = Vec::new();
            while let Some(row) = rows.next()? {
                labels.push(row_to_label(row)?);
            }

            Ok(labels)
        })
        .await
    }

    /// Delete a label together with every assignment that uses it
    pub async fn delete_label(&self, label_id: String) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "DELETE FROM label_assignments WHERE label_id = ?1",
                params![label_id],
            )
            .context("failed to delete label assignments")?;

            let rows_affected = tx
                .execute("DELETE FROM labels WHERE id = ?1", params![label_id])
                .context("failed to delete label")?;
            if rows_affected == 0 {
                return Err(anyhow!("Label not found or already deleted"));
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }
}

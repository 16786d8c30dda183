use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{parse_details, parse_optional_datetime},
    models::{LabelAssignment, NewAssignment},
};

fn row_to_assignment(row: &Row) -> Result<LabelAssignment> {
    let assigned_at: Option<String> = row.get("assigned_at")?;
    let details: Option<String> = row.get("record_details")?;

    Ok(LabelAssignment {
        id: row.get("id")?,
        item_id: row.get("item_id")?,
        subject_or_name: row.get("subject_or_name")?,
        object_type: row.get("object_type")?,
        object_api_name: row.get("object_api_name")?,
        icon_name: row.get("icon_name")?,
        label_assigned_date: parse_optional_datetime(assigned_at, "assigned_at")?,
        record_details: parse_details(details)?,
    })
}

impl Database {
    /// Apply a label to a record. Returns the new assignment id.
    pub async fn assign(&self, label_id: &str, input: NewAssignment) -> Result<String> {
        let label_id = label_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let label_exists: i64 = tx.query_row(
                "SELECT COUNT(*) FROM labels WHERE id = ?1",
                params![label_id],
                |row| row.get(0),
            )?;
            if label_exists == 0 {
                bail!("Label {} does not exist", label_id);
            }

            let id = Uuid::new_v4().to_string();
            let details = serde_json::to_string(&input.record_details)?;
            tx.execute(
                "INSERT INTO label_assignments
                    (id, label_id, item_id, subject_or_name, object_type, object_api_name,
                     assigned_at, record_details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    label_id,
                    input.item_id,
                    input.subject_or_name,
                    input.object_type,
                    input.object_api_name,
                    Utc::now().to_rfc3339(),
                    details,
                ],
            )
            .context("failed to insert label assignment")?;

            tx.execute(
                "UPDATE labels SET total_assignments = total_assignments + 1 WHERE id = ?1",
                params![label_id],
            )?;

            tx.commit()?;
            Ok(id)
        })
        .await
    }

    pub async fn get_assignments(&self, label_id: &str) -> Result<Vec<LabelAssignment>> {
        let label_id = label_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, item_id, subject_or_name, object_type, object_api_name,
                        icon_name, assigned_at, record_details
                 FROM label_assignments
                 WHERE label_id = ?1
                 ORDER BY assigned_at DESC",
            )?;

            let mut rows = stmt.query(params![label_id])?;
            let mut assignments = Vec::new();
            while let Some(row) = rows.next()? {
                assignments.push(row_to_assignment(row)?);
            }

            Ok(assignments)
        })
        .await
    }

    pub async fn delete_assignment(&self, assignment_id: &str) -> Result<()> {
        self.delete_assignments(vec![assignment_id.to_string()])
            .await
    }

    /// Remove several assignments atomically. Fails without deleting anything
    /// if any of the ids is unknown.
    pub async fn delete_assignments(&self, assignment_ids: Vec<String>) -> Result<()> {
        let assignment_ids: Vec<String> = assignment_ids
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if assignment_ids.is_empty() {
            return Ok(());
        }

        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let placeholders = vec!["?"; assignment_ids.len()].join(", ");

            // Keep the advisory per-label counters roughly in line.
            tx.execute(
                &format!(
                    "UPDATE labels
                     SET total_assignments = MAX(0, total_assignments - (
                         SELECT COUNT(*) FROM label_assignments a
                         WHERE a.label_id = labels.id AND a.id IN ({placeholders})
                     ))"
                ),
                params_from_iter(assignment_ids.iter()),
            )?;

            let deleted = tx
                .execute(
                    &format!("DELETE FROM label_assignments WHERE id IN ({placeholders})"),
                    params_from_iter(assignment_ids.iter()),
                )
                .context("failed to delete label assignments")?;

            if deleted != assignment_ids.len() {
                return Err(anyhow!(
                    "Expected to delete {} assignment(s) but found {}",
                    assignment_ids.len(),
                    deleted
                ));
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }
}

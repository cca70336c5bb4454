//! Dependent stages: rewrite foreign keys through the ID mapping and insert.
//!
//! A row whose reference is not in the mapping is skipped and reported. It is
//! never inserted with the original identifier or a null reference.

use super::{IdMapping, Stage};
use crate::db::media::insert_media;
use crate::db::tags::{ensure_tag, link_project_tag};
use crate::db::{Database, now_ms};
use crate::error::{ImportError, Result};
use crate::types::{MediaRow, TagRow, non_blank};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

/// A dependent row left out because its reference did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub stage: Stage,
    /// 1-based data row number.
    pub row: usize,
    /// Human-readable identity of the record (URL or tag name).
    pub record: String,
    /// The original project id as read, if any.
    pub reference: Option<String>,
}

/// Result of a committed dependent stage.
#[derive(Debug, Clone, Default)]
pub struct DependentOutcome {
    pub inserted: usize,
    pub skipped: usize,
    pub skipped_rows: Vec<SkippedRow>,
}

enum Resolution {
    Resolved(i64),
    Unresolved(Option<String>),
}

fn resolve(mapping: &IdMapping, reference: Option<&str>) -> Resolution {
    match non_blank(reference) {
        Some(original) => match mapping.get(original) {
            Some(assigned) => Resolution::Resolved(assigned),
            None => Resolution::Unresolved(Some(original.to_string())),
        },
        None => Resolution::Unresolved(None),
    }
}

/// Shared loop for a dependent stage: one transaction, per-row resolution,
/// skip on unresolved, abort on store error.
fn run_stage<R, F>(
    db: &mut Database,
    stage: Stage,
    rows: &[R],
    mut apply: F,
) -> Result<DependentOutcome>
where
    F: FnMut(&Connection, usize, &R) -> Result<Option<SkippedRow>>,
{
    let total = rows.len();
    info!(total, "Importing {}", stage);

    db.with_conn_mut(|conn| {
        let tx = conn.transaction().map_err(|e| ImportError::store(stage, e))?;
        let mut outcome = DependentOutcome::default();

        for (index, row) in rows.iter().enumerate() {
            let row_no = index + 1;
            match apply(&tx, row_no, row)? {
                Some(skipped) => {
                    warn!(
                        stage = %stage,
                        row = row_no,
                        record = %skipped.record,
                        reference = skipped.reference.as_deref().unwrap_or("<none>"),
                        "Skipping {} row {}: project reference not found in ID mapping",
                        stage,
                        row_no
                    );
                    outcome.skipped += 1;
                    outcome.skipped_rows.push(skipped);
                }
                None => {
                    outcome.inserted += 1;
                    info!("Imported {} {}/{}", stage.singular(), row_no, total);
                }
            }
        }

        tx.commit().map_err(|e| ImportError::store(stage, e))?;

        info!(
            "{} imported successfully: {} inserted, {} skipped",
            stage.title(),
            outcome.inserted,
            outcome.skipped
        );
        Ok(outcome)
    })
}

/// Import media rows, rewriting `projectId` through the mapping.
pub fn import_media(db: &mut Database, rows: &[MediaRow], mapping: &IdMapping) -> Result<DependentOutcome> {
    run_stage(db, Stage::Media, rows, |conn, row_no, row| {
        let record = row.url.clone().unwrap_or_else(|| format!("media row {}", row_no));
        match resolve(mapping, row.project_id.as_deref()) {
            Resolution::Unresolved(reference) => Ok(Some(SkippedRow {
                stage: Stage::Media,
                row: row_no,
                record,
                reference,
            })),
            Resolution::Resolved(project_id) => {
                insert_media(conn, row, project_id, now_ms()).map_err(|source| {
                    ImportError::RowInsert {
                        stage: Stage::Media,
                        row: row_no,
                        id: record,
                        source,
                    }
                })?;
                Ok(None)
            }
        }
    })
}

/// Import tag rows.
///
/// A row with a `projectId` is applied only if the reference resolves: the
/// tag is created (or reused) and linked to the remapped project. A row
/// without `projectId` only creates the tag.
pub fn import_tags(db: &mut Database, rows: &[TagRow], mapping: &IdMapping) -> Result<DependentOutcome> {
    run_stage(db, Stage::Tags, rows, |conn, row_no, row| {
        let name = non_blank(row.name.as_deref());
        let record = name.map(str::to_string).unwrap_or_else(|| format!("tag row {}", row_no));
        let reject = |source| ImportError::RowInsert {
            stage: Stage::Tags,
            row: row_no,
            id: record.clone(),
            source,
        };

        let project_id = if non_blank(row.project_id.as_deref()).is_some() {
            match resolve(mapping, row.project_id.as_deref()) {
                Resolution::Resolved(id) => Some(id),
                Resolution::Unresolved(reference) => {
                    return Ok(Some(SkippedRow {
                        stage: Stage::Tags,
                        row: row_no,
                        record: record.clone(),
                        reference,
                    }));
                }
            }
        } else {
            None
        };

        let tag_id = ensure_tag(conn, name, now_ms()).map_err(reject)?;
        if let Some(project_id) = project_id {
            link_project_tag(conn, project_id, tag_id).map_err(reject)?;
        }
        Ok(None)
    })
}

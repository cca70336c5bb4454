//! Parent stage: validate and insert projects, building the ID mapping.

use super::{IdMapping, Stage};
use crate::config::ImportPolicy;
use crate::db::projects::{ProjectDefaults, insert_project};
use crate::db::{Database, now_ms};
use crate::error::{ImportError, Result};
use crate::types::{ProjectRow, ValidProject, non_blank};
use tracing::info;

/// Result of a committed parent stage.
#[derive(Debug, Clone, Default)]
pub struct ParentOutcome {
    /// Original id → assigned id for every committed project.
    pub mapping: IdMapping,
    /// Rows processed (equal to rows committed).
    pub processed: usize,
}

/// Check the required fields of one project row.
///
/// `row_no` is the 1-based data row number used in diagnostics.
pub fn validate_project(row: &ProjectRow, row_no: usize, policy: &ImportPolicy) -> Result<ValidProject> {
    let original_id = non_blank(row.id.as_deref())
        .ok_or_else(|| ImportError::missing_field(row_no, "<none>", "id"))?;

    let required = |value: &Option<String>, field: &'static str| -> Result<String> {
        non_blank(value.as_deref())
            .map(str::to_string)
            .ok_or_else(|| ImportError::missing_field(row_no, original_id, field))
    };

    let title = required(&row.title, "title")?;
    let description = required(&row.description, "description")?;
    let institution = required(&row.institution, "institution")?;
    let project_type = required(&row.project_type, "projectType")?;
    let skill_level = required(&row.skill_level, "skillLevel")?;

    if !policy.accepts_project_type(&project_type) {
        return Err(ImportError::invalid_value(
            row_no,
            original_id,
            "projectType",
            format!("'{}' is not one of {}", project_type, policy.project_types.join(", ")),
        ));
    }
    if !policy.accepts_skill_level(&skill_level) {
        return Err(ImportError::invalid_value(
            row_no,
            original_id,
            "skillLevel",
            format!("'{}' is not one of {}", skill_level, policy.skill_levels.join(", ")),
        ));
    }

    Ok(ValidProject {
        original_id: original_id.to_string(),
        title,
        description,
        institution,
        project_type,
        skill_level,
    })
}

pub(crate) fn duplicate_id(row_no: usize, id: &str) -> ImportError {
    ImportError::invalid_value(row_no, id, "id", "appears more than once in the file")
}

/// Insert all projects in one transaction and return the ID mapping.
///
/// Any validation or insert failure rolls back every project of this stage;
/// the caller then holds no mapping at all.
pub fn import_projects(
    db: &mut Database,
    rows: &[ProjectRow],
    policy: &ImportPolicy,
    caller: Option<i64>,
) -> Result<ParentOutcome> {
    let total = rows.len();
    let creator_id = policy.creator_for(caller);
    info!(total, creator_id, "Importing projects");

    db.with_conn_mut(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ImportError::store(Stage::Projects, e))?;

        // Only returned after commit; dropped together with `tx` on error.
        let mut pending = IdMapping::new();

        for (index, row) in rows.iter().enumerate() {
            let row_no = index + 1;
            let project = validate_project(row, row_no, policy)?;
            if pending.contains(&project.original_id) {
                return Err(duplicate_id(row_no, &project.original_id));
            }

            let defaults = ProjectDefaults {
                status: &policy.default_status,
                creator_id,
                now: now_ms(),
            };
            let assigned = insert_project(&tx, &project, defaults).map_err(|source| {
                ImportError::RowInsert {
                    stage: Stage::Projects,
                    row: row_no,
                    id: project.original_id.clone(),
                    source,
                }
            })?;

            pending.insert(project.original_id, assigned)?;
            info!("Imported project {}/{}", row_no, total);
        }

        tx.commit()
            .map_err(|e| ImportError::store(Stage::Projects, e))?;

        info!("Projects imported successfully: {} rows", pending.len());
        Ok(ParentOutcome {
            processed: total,
            mapping: pending,
        })
    })
}

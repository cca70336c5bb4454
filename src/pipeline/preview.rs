//! Dry-run preview of an import.
//!
//! Resolves dependent references against the original ids in the parent file
//! without opening the database.

use super::{ImportInput, Stage};
use super::parents::{duplicate_id, validate_project};
use crate::config::ImportPolicy;
use crate::types::non_blank;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Result of a dry-run import preview.
/// Shows what would happen without making any changes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DryRunReport {
    /// Projects that would be inserted.
    pub projects: usize,
    /// Media rows whose project reference resolves.
    pub media_resolved: usize,
    /// Media rows that would be skipped.
    pub media_skipped: usize,
    /// Tag rows that would be applied (`None` when tags are disabled).
    pub tags_resolved: Option<usize>,
    pub tags_skipped: Option<usize>,
    /// Whether every stage would commit.
    pub would_succeed: bool,
    /// Stage the run would abort in.
    pub failed_stage: Option<Stage>,
    /// Reason that stage would fail.
    pub failure_reason: Option<String>,
}

impl DryRunReport {
    fn fail(&mut self, stage: Stage, reason: String) {
        self.would_succeed = false;
        self.failed_stage = Some(stage);
        self.failure_reason = Some(reason);
    }
}

impl fmt::Display for DryRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dry run (no changes made)")?;
        if self.failed_stage != Some(Stage::Projects) {
            writeln!(f, "  Projects: {} would be imported", self.projects)?;
        }
        if self.failed_stage.is_none() {
            writeln!(
                f,
                "  Media:    {} would be imported, {} skipped",
                self.media_resolved, self.media_skipped
            )?;
            if let (Some(resolved), Some(skipped)) = (self.tags_resolved, self.tags_skipped) {
                writeln!(f, "  Tags:     {} would be imported, {} skipped", resolved, skipped)?;
            }
        }
        if let (Some(stage), Some(reason)) = (self.failed_stage, &self.failure_reason) {
            writeln!(f, "  {}: would fail: {}", stage.title(), reason)?;
        }
        Ok(())
    }
}

/// Preview an import of `input` under `policy`.
///
/// Parent rows are validated as the parent stage would. Dependent rows are
/// resolved against the original ids of the parent file, and resolved rows
/// are checked for the values the store requires, so a row the database
/// would reject fails the preview for its stage.
pub fn preview(input: &ImportInput, policy: &ImportPolicy) -> DryRunReport {
    let mut report = DryRunReport {
        would_succeed: true,
        ..Default::default()
    };

    let mut originals: HashSet<String> = HashSet::new();
    for (index, row) in input.projects.iter().enumerate() {
        let row_no = index + 1;
        let validated = validate_project(row, row_no, policy).and_then(|project| {
            if originals.contains(&project.original_id) {
                Err(duplicate_id(row_no, &project.original_id))
            } else {
                Ok(project)
            }
        });
        match validated {
            Ok(project) => {
                originals.insert(project.original_id);
            }
            Err(e) => {
                report.fail(Stage::Projects, e.to_string());
                return report;
            }
        }
    }
    report.projects = originals.len();

    if originals.is_empty() {
        report.fail(Stage::Projects, "no projects to import".to_string());
        return report;
    }

    let resolves = |reference: Option<&str>| {
        non_blank(reference).is_some_and(|id| originals.contains(id))
    };

    for (index, row) in input.media.iter().enumerate() {
        if !resolves(row.project_id.as_deref()) {
            report.media_skipped += 1;
            continue;
        }
        let missing = [
            ("url", &row.url),
            ("key", &row.key),
            ("type", &row.media_type),
        ]
        .into_iter()
        .find_map(|(field, value)| value.is_none().then_some(field));
        if let Some(field) = missing {
            let record = row.url.clone().unwrap_or_else(|| format!("media row {}", index + 1));
            report.fail(
                Stage::Media,
                format!("row {} ({}): {} is required", index + 1, record, field),
            );
            return report;
        }
        report.media_resolved += 1;
    }

    if let Some(tags) = &input.tags {
        let (mut resolved, mut skipped) = (0, 0);
        for (index, row) in tags.iter().enumerate() {
            // A tag without a project reference is still created.
            let referenced = non_blank(row.project_id.as_deref()).is_some();
            if referenced && !resolves(row.project_id.as_deref()) {
                skipped += 1;
                continue;
            }
            if non_blank(row.name.as_deref()).is_none() {
                report.fail(Stage::Tags, format!("row {}: name is required", index + 1));
                return report;
            }
            resolved += 1;
        }
        report.tags_resolved = Some(resolved);
        report.tags_skipped = Some(skipped);
    }

    report
}

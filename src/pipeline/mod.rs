//! Import pipeline: parent stage, dependent stages, and the orchestrator
//! sequencing them.
//!
//! Each stage runs in its own transaction. The parent stage produces the
//! [`IdMapping`]; dependent stages only ever see it by shared reference and
//! only after the parent transaction committed.

pub mod dependents;
pub mod mapping;
pub mod parents;
pub mod preview;

pub use dependents::{DependentOutcome, SkippedRow, import_media, import_tags};
pub use mapping::IdMapping;
pub use parents::{ParentOutcome, import_projects, validate_project};
pub use preview::{DryRunReport, preview};

use crate::config::ImportPolicy;
use crate::db::Database;
use crate::error::{ImportError, Result};
use crate::types::{MediaRow, ProjectRow, TagRow};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{error, info};

/// A unit of work with its own transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Projects,
    Media,
    Tags,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Projects => "projects",
            Stage::Media => "media",
            Stage::Tags => "tags",
        }
    }

    /// Name of one record of this stage, for progress lines.
    pub fn singular(&self) -> &'static str {
        match self {
            Stage::Projects => "project",
            Stage::Media => "media",
            Stage::Tags => "tag",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Projects => "Projects",
            Stage::Media => "Media",
            Stage::Tags => "Tags",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    ParentsImported,
    DependentsImported,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal run state transition {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: RunState,
    pub to: RunState,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::DependentsImported | RunState::Aborted)
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn advance(self, next: RunState) -> std::result::Result<RunState, IllegalTransition> {
        let allowed = matches!(
            (self, next),
            (RunState::Init, RunState::ParentsImported)
                | (RunState::Init, RunState::Aborted)
                | (RunState::ParentsImported, RunState::DependentsImported)
                | (RunState::ParentsImported, RunState::Aborted)
        );
        if allowed {
            Ok(next)
        } else {
            Err(IllegalTransition { from: self, to: next })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Committed,
    Failed,
    NotRun,
}

/// Per-stage line of a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    /// Rows read for this stage.
    pub processed: usize,
    /// Rows committed.
    pub inserted: usize,
    /// Rows skipped for an unresolved reference.
    pub skipped: usize,
}

/// The error that ended a run early.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: ImportError,
}

/// Outcome of a pipeline run. `Display` renders the final status line.
#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub stages: Vec<StageReport>,
    pub failure: Option<StageFailure>,
    pub skipped_rows: Vec<SkippedRow>,
}

impl RunReport {
    fn new(input: &ImportInput) -> Self {
        let mut stages = vec![
            StageReport::pending(Stage::Projects, input.projects.len()),
            StageReport::pending(Stage::Media, input.media.len()),
        ];
        if let Some(tags) = &input.tags {
            stages.push(StageReport::pending(Stage::Tags, tags.len()));
        }
        Self {
            state: RunState::Init,
            stages,
            failure: None,
            skipped_rows: Vec::new(),
        }
    }

    /// True when every stage that ran committed.
    pub fn is_success(&self) -> bool {
        self.state == RunState::DependentsImported && self.failure.is_none()
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn total_inserted(&self) -> usize {
        self.stages.iter().map(|s| s.inserted).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.stages.iter().map(|s| s.skipped).sum()
    }

    fn stage_mut(&mut self, stage: Stage) -> Option<&mut StageReport> {
        self.stages.iter_mut().find(|s| s.stage == stage)
    }

    fn committed(&mut self, stage: Stage, inserted: usize, skipped: usize) {
        if let Some(entry) = self.stage_mut(stage) {
            entry.status = StageStatus::Committed;
            entry.inserted = inserted;
            entry.skipped = skipped;
        }
    }

    fn transition(&mut self, next: RunState) {
        match self.state.advance(next) {
            Ok(state) => self.state = state,
            Err(e) => {
                debug_assert!(false, "{}", e);
                error!("{}", e);
                self.state = RunState::Aborted;
            }
        }
    }

    /// Record a stage error and abort the run.
    fn fail(&mut self, stage: Stage, error: ImportError) {
        error!(stage = %stage, "{} stage failed: {}", stage.title(), error);
        if let Some(entry) = self.stage_mut(stage) {
            entry.status = StageStatus::Failed;
        }
        self.abort(stage, error);
    }

    fn abort(&mut self, stage: Stage, error: ImportError) {
        self.failure = Some(StageFailure { stage, error });
        self.transition(RunState::Aborted);
    }
}

impl StageReport {
    fn pending(stage: Stage, processed: usize) -> Self {
        Self {
            stage,
            status: StageStatus::NotRun,
            processed,
            inserted: 0,
            skipped: 0,
        }
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            StageStatus::Committed if self.skipped > 0 => write!(
                f,
                "{} {} imported, {} skipped",
                self.stage, self.inserted, self.skipped
            ),
            StageStatus::Committed => write!(f, "{} {} imported", self.stage, self.inserted),
            StageStatus::Failed => write!(f, "{} failed", self.stage),
            StageStatus::NotRun => write!(f, "{} not run", self.stage),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<String> = self.stages.iter().map(ToString::to_string).collect();
        match &self.failure {
            None => write!(f, "Import completed: {}", stages.join("; ")),
            Some(failure) => write!(
                f,
                "Import aborted at {} stage: {} ({})",
                failure.stage,
                failure.error,
                stages.join("; ")
            ),
        }
    }
}

/// Rows read from the source files.
#[derive(Debug, Clone, Default)]
pub struct ImportInput {
    pub projects: Vec<ProjectRow>,
    pub media: Vec<MediaRow>,
    /// `None` when the tag stage is disabled.
    pub tags: Option<Vec<TagRow>>,
}

/// Sequences the stages of one import run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    policy: ImportPolicy,
    caller: Option<i64>,
}

impl Pipeline {
    pub fn new(policy: ImportPolicy) -> Self {
        Self {
            policy,
            caller: None,
        }
    }

    /// Attribute imported projects to this user instead of the default creator.
    pub fn with_caller(mut self, caller: Option<i64>) -> Self {
        self.caller = caller;
        self
    }

    /// Run every stage against `db`, then close the connection.
    pub fn run(&self, mut db: Database, input: &ImportInput) -> RunReport {
        let mut report = RunReport::new(input);
        self.run_stages(&mut db, input, &mut report);
        db.close();

        if report.is_success() {
            info!("{}", report);
        } else {
            error!("{}", report);
        }
        report
    }

    fn run_stages(&self, db: &mut Database, input: &ImportInput, report: &mut RunReport) {
        let parents = match import_projects(db, &input.projects, &self.policy, self.caller) {
            Ok(outcome) => outcome,
            Err(e) => return report.fail(Stage::Projects, e),
        };
        report.committed(Stage::Projects, parents.mapping.len(), 0);

        if parents.mapping.is_empty() {
            error!("No projects imported, skipping dependent stages");
            return report.abort(Stage::Projects, ImportError::NothingImported);
        }
        report.transition(RunState::ParentsImported);

        let mapping = &parents.mapping;
        if let Err(e) = self.run_dependent(Stage::Media, report, || {
            import_media(db, &input.media, mapping)
        }) {
            return report.fail(Stage::Media, e);
        }

        if let Some(tags) = &input.tags {
            if let Err(e) = self.run_dependent(Stage::Tags, report, || import_tags(db, tags, mapping)) {
                return report.fail(Stage::Tags, e);
            }
        }

        report.transition(RunState::DependentsImported);
    }

    fn run_dependent<F>(&self, stage: Stage, report: &mut RunReport, run: F) -> Result<()>
    where
        F: FnOnce() -> Result<DependentOutcome>,
    {
        let outcome = run()?;
        report.committed(stage, outcome.inserted, outcome.skipped);
        report.skipped_rows.extend(outcome.skipped_rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        assert_eq!(
            RunState::Init.advance(RunState::ParentsImported),
            Ok(RunState::ParentsImported)
        );
        assert_eq!(RunState::Init.advance(RunState::Aborted), Ok(RunState::Aborted));
        assert_eq!(
            RunState::ParentsImported.advance(RunState::DependentsImported),
            Ok(RunState::DependentsImported)
        );
        assert!(RunState::Init.advance(RunState::DependentsImported).is_err());
        assert!(RunState::Aborted.advance(RunState::ParentsImported).is_err());
        assert!(RunState::DependentsImported.advance(RunState::Aborted).is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunState::Aborted.is_terminal());
        assert!(RunState::DependentsImported.is_terminal());
        assert!(!RunState::Init.is_terminal());
        assert!(!RunState::ParentsImported.is_terminal());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Projects.to_string(), "projects");
        assert_eq!(Stage::Tags.singular(), "tag");
    }

    #[test]
    fn test_empty_input_aborts_with_nothing_imported() {
        let db = Database::open_in_memory().unwrap();
        let report = Pipeline::new(ImportPolicy::default()).run(db, &ImportInput::default());

        assert_eq!(report.state, RunState::Aborted);
        assert!(!report.is_success());
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.stage, Stage::Projects);
        assert!(matches!(failure.error, ImportError::NothingImported));
        assert_eq!(report.stage(Stage::Media).unwrap().status, StageStatus::NotRun);
    }

    #[test]
    fn test_report_line() {
        let mut report = RunReport::new(&ImportInput::default());
        report.committed(Stage::Projects, 2, 0);
        report.committed(Stage::Media, 1, 1);
        report.transition(RunState::ParentsImported);
        report.transition(RunState::DependentsImported);

        assert!(report.is_success());
        assert_eq!(
            report.to_string(),
            "Import completed: projects 2 imported; media 1 imported, 1 skipped"
        );
    }
}

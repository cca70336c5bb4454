//! CSV source reading.
//!
//! Headers are checked up front so a missing column stops the run before any
//! transaction opens. Empty cells deserialize to `None`.

use crate::error::{ImportError, Result};
use crate::pipeline::ImportInput;
use crate::types::{MEDIA_COLUMNS, PROJECT_COLUMNS, TAG_COLUMNS};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rows shown in the debug preview of each file.
const PREVIEW_ROWS: usize = 5;

/// Resolved input file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFiles {
    pub projects: PathBuf,
    pub media: PathBuf,
    /// `None` when tags are disabled.
    pub tags: Option<PathBuf>,
}

impl InputFiles {
    /// Every file the run reads, projects first.
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        [Some(&self.projects), Some(&self.media), self.tags.as_ref()]
            .into_iter()
            .flatten()
    }
}

/// Read all input files of a run.
///
/// Every file is checked for existence before any of them is parsed.
pub fn read_input(files: &InputFiles) -> Result<ImportInput> {
    if let Some(missing) = files.all().find(|path| !path.is_file()) {
        return Err(ImportError::input(missing, "file not found"));
    }

    Ok(ImportInput {
        projects: read_csv(&files.projects, PROJECT_COLUMNS)?,
        media: read_csv(&files.media, MEDIA_COLUMNS)?,
        tags: files
            .tags
            .as_deref()
            .map(|path| read_csv(path, TAG_COLUMNS))
            .transpose()?,
    })
}

/// Read every row of a CSV file, requiring the given header columns.
pub fn read_csv<T>(path: &Path, required: &[&str]) -> Result<Vec<T>>
where
    T: DeserializeOwned + Debug,
{
    if !path.is_file() {
        return Err(ImportError::input(path, "file not found"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ImportError::input(path, e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| ImportError::input(path, e.to_string()))?
        .clone();
    let columns: Vec<&str> = headers.iter().collect();
    debug!(file = %path.display(), ?columns, "CSV columns");

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !columns.contains(col))
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::input(
            path,
            format!("missing required column(s): {}", missing.join(", ")),
        ));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<T>().enumerate() {
        let row = record.map_err(|e| {
            ImportError::input(path, format!("row {}: {}", index + 1, e))
        })?;
        if index < PREVIEW_ROWS {
            debug!(file = %path.display(), row = index + 1, "{:?}", row);
        }
        rows.push(row);
    }

    debug!(file = %path.display(), rows = rows.len(), "Read CSV file");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MediaRow, ProjectRow, TagRow};
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_projects_with_blank_cells() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "projects.csv",
            "id,title,description,institution,projectType,skillLevel,extra\n\
             101, A ,desc,MIT,INNOVATION,BEGINNER,x\n\
             102,,desc,MIT,INNOVATION,BEGINNER,y\n",
        );

        let rows: Vec<ProjectRow> = read_csv(&path, PROJECT_COLUMNS).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_deref(), Some("101"));
        assert_eq!(rows[0].title.as_deref(), Some("A"));
        assert_eq!(rows[1].title, None);
    }

    #[test]
    fn test_missing_column_is_input_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "media.csv", "projectId,url,type\n101,u1,image/png\n");

        let err = read_csv::<MediaRow>(&path, MEDIA_COLUMNS).unwrap_err();
        match err {
            ImportError::Input { message, .. } => assert!(message.contains("key")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let dir = TempDir::new().unwrap();
        let err = read_csv::<MediaRow>(&dir.path().join("nope.csv"), MEDIA_COLUMNS).unwrap_err();
        assert!(err.is_pre_transaction());
    }

    #[test]
    fn test_tags_without_project_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tags.csv", "name\nrobotics\nai\n");

        let rows: Vec<TagRow> = read_csv(&path, TAG_COLUMNS).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name.as_deref(), Some("ai"));
        assert!(rows.iter().all(|r| r.project_id.is_none()));
    }

    #[test]
    fn test_read_input_checks_every_file_first() {
        let dir = TempDir::new().unwrap();
        // Malformed projects file: would fail parsing if it were read first.
        write(&dir, "projects.csv", "id,title\n1,A\n");
        write(&dir, "media.csv", "projectId,url,key,type\n");
        let files = InputFiles {
            projects: dir.path().join("projects.csv"),
            media: dir.path().join("media.csv"),
            tags: Some(dir.path().join("tags.csv")),
        };

        match read_input(&files).unwrap_err() {
            ImportError::Input { path, message } => {
                assert_eq!(path, dir.path().join("tags.csv"));
                assert_eq!(message, "file not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_input_without_tags() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "projects.csv",
            "id,title,description,institution,projectType,skillLevel\n1,A,d,i,INNOVATION,BEGINNER\n",
        );
        write(&dir, "media.csv", "projectId,url,key,type\n1,u,k,image/png\n");
        let files = InputFiles {
            projects: dir.path().join("projects.csv"),
            media: dir.path().join("media.csv"),
            tags: None,
        };
        assert_eq!(files.all().count(), 2);

        let input = read_input(&files).unwrap();
        assert_eq!(input.projects.len(), 1);
        assert_eq!(input.media.len(), 1);
        assert!(input.tags.is_none());
    }
}

//! Error taxonomy for the import pipeline.
//!
//! Stage-local errors carry the row index and the offending original
//! identifier so a failed run can be diagnosed from the log alone.

use crate::pipeline::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or running an import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The target store could not be opened or prepared.
    #[error("Cannot connect to database: {message}")]
    Connection { message: String },

    /// An input file is missing, unreadable, or lacks a required column.
    #[error("Input error in {}: {message}", path.display())]
    Input { path: PathBuf, message: String },

    /// A parent row failed validation.
    #[error("Row {row} (id {id}): {field} {reason}")]
    Validation {
        row: usize,
        id: String,
        field: &'static str,
        reason: String,
    },

    /// The store rejected an otherwise valid row.
    #[error("{stage} row {row} ({id}) rejected by database: {source}")]
    RowInsert {
        stage: Stage,
        row: usize,
        id: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Begin, commit or rollback failed.
    #[error("{stage} transaction failed: {source}")]
    Store {
        stage: Stage,
        #[source]
        source: rusqlite::Error,
    },

    /// An original identifier was mapped twice within one run.
    #[error(transparent)]
    Mapping(#[from] MappingConflict),

    /// The parent stage committed nothing, so dependents have nothing to reference.
    #[error("no projects were imported; dependent stages skipped")]
    NothingImported,

    /// Invalid configuration value.
    #[error("Configuration error ({key}): {message}")]
    Config { key: String, message: String },
}

impl ImportError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn input(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing_field(row: usize, id: &str, field: &'static str) -> Self {
        Self::Validation {
            row,
            id: id.to_string(),
            field,
            reason: "is required".to_string(),
        }
    }

    pub fn invalid_value(row: usize, id: &str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            row,
            id: id.to_string(),
            field,
            reason: reason.into(),
        }
    }

    pub fn store(stage: Stage, source: rusqlite::Error) -> Self {
        Self::Store { stage, source }
    }

    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    /// True for errors that stop the run before any transaction is opened.
    pub fn is_pre_transaction(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Input { .. } | Self::Config { .. }
        )
    }
}

/// Attempt to overwrite an existing ID mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("original id {original} already mapped to {existing}")]
pub struct MappingConflict {
    pub original: String,
    pub existing: i64,
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_row_and_field() {
        let err = ImportError::missing_field(3, "101", "title");
        assert_eq!(err.to_string(), "Row 3 (id 101): title is required");
    }

    #[test]
    fn test_pre_transaction_classification() {
        assert!(ImportError::connection("refused").is_pre_transaction());
        assert!(ImportError::input("projects.csv", "not found").is_pre_transaction());
        assert!(!ImportError::NothingImported.is_pre_transaction());
        assert!(!ImportError::missing_field(1, "1", "title").is_pre_transaction());
    }

    #[test]
    fn test_row_insert_message() {
        let err = ImportError::RowInsert {
            stage: Stage::Media,
            row: 2,
            id: "u2".to_string(),
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().starts_with("media row 2 (u2) rejected by database"));
    }
}

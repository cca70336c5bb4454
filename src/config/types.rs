//! Configuration types and structures.

use crate::error::{ImportError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub import: ImportPolicy,
}

impl Config {
    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.import.validate()?;
        if self.input.projects_file.trim().is_empty() {
            return Err(ImportError::config("input.projectsFile", "must not be empty"));
        }
        if self.input.media_file.trim().is_empty() {
            return Err(ImportError::config("input.mediaFile", "must not be empty"));
        }
        if self.input.import_tags && self.input.tags_file.trim().is_empty() {
            return Err(ImportError::config("input.tagsFile", "must not be empty"));
        }
        Ok(())
    }
}

/// Target store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Connection string (SQLite path or `sqlite://` URL).
    #[serde(default)]
    pub url: Option<String>,
}

/// Location of the CSV exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    /// Directory containing the CSV files.
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,

    #[serde(default = "default_projects_file")]
    pub projects_file: String,

    #[serde(default = "default_media_file")]
    pub media_file: String,

    #[serde(default = "default_tags_file")]
    pub tags_file: String,

    /// Whether the tags file is imported.
    #[serde(default = "default_true")]
    pub import_tags: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            csv_dir: default_csv_dir(),
            projects_file: default_projects_file(),
            media_file: default_media_file(),
            tags_file: default_tags_file(),
            import_tags: true,
        }
    }
}

impl InputConfig {
    pub fn projects_path(&self) -> PathBuf {
        self.csv_dir.join(&self.projects_file)
    }

    pub fn media_path(&self) -> PathBuf {
        self.csv_dir.join(&self.media_file)
    }

    pub fn tags_path(&self) -> PathBuf {
        self.csv_dir.join(&self.tags_file)
    }
}

fn default_csv_dir() -> PathBuf {
    PathBuf::from("data/csv")
}

fn default_projects_file() -> String {
    "projects.csv".to_string()
}

fn default_media_file() -> String {
    "media.csv".to_string()
}

fn default_tags_file() -> String {
    "tags.csv".to_string()
}

fn default_true() -> bool {
    true
}

/// Policy constants applied to every imported project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPolicy {
    /// Owner assigned when the caller supplies no identity.
    #[serde(default = "default_creator_id")]
    pub default_creator_id: i64,

    /// Status written on every imported project.
    #[serde(default = "default_status")]
    pub default_status: String,

    /// Accepted `projectType` values. Empty accepts any non-blank value.
    #[serde(default = "default_project_types")]
    pub project_types: Vec<String>,

    /// Accepted `skillLevel` values. Empty accepts any non-blank value.
    #[serde(default = "default_skill_levels")]
    pub skill_levels: Vec<String>,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            default_creator_id: default_creator_id(),
            default_status: default_status(),
            project_types: default_project_types(),
            skill_levels: default_skill_levels(),
        }
    }
}

impl ImportPolicy {
    /// Policy that accepts any category value.
    pub fn permissive() -> Self {
        Self {
            project_types: Vec::new(),
            skill_levels: Vec::new(),
            ..Self::default()
        }
    }

    /// Creator written on imported projects.
    pub fn creator_for(&self, caller: Option<i64>) -> i64 {
        caller.unwrap_or(self.default_creator_id)
    }

    pub fn accepts_project_type(&self, value: &str) -> bool {
        self.project_types.is_empty() || self.project_types.iter().any(|t| t == value)
    }

    pub fn accepts_skill_level(&self, value: &str) -> bool {
        self.skill_levels.is_empty() || self.skill_levels.iter().any(|l| l == value)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_status.trim().is_empty() {
            return Err(ImportError::config("import.defaultStatus", "must not be empty"));
        }
        Ok(())
    }
}

fn default_creator_id() -> i64 {
    1
}

fn default_status() -> String {
    "active".to_string()
}

fn default_project_types() -> Vec<String> {
    ["ENTREPRENEURSHIP", "INNOVATION", "PRODUCT_DEVELOPMENT"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_skill_levels() -> Vec<String> {
    ["BEGINNER", "INTERMEDIATE", "ADVANCED"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.import.default_creator_id, 1);
        assert_eq!(config.import.default_status, "active");
        assert_eq!(config.input.projects_path(), PathBuf::from("data/csv/projects.csv"));
        assert!(config.input.import_tags);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_policy_keys_are_camel_case() {
        let policy: ImportPolicy =
            serde_yaml::from_str("defaultCreatorId: 9\ndefaultStatus: draft\n").unwrap();
        assert_eq!(policy.default_creator_id, 9);
        assert_eq!(policy.default_status, "draft");
        assert_eq!(policy.skill_levels.len(), 3);

        let input: InputConfig = serde_yaml::from_str("csvDir: exports\nimportTags: false\n").unwrap();
        assert_eq!(input.projects_path(), PathBuf::from("exports/projects.csv"));
        assert!(!input.import_tags);
    }

    #[test]
    fn test_creator_for_prefers_caller() {
        let policy = ImportPolicy::default();
        assert_eq!(policy.creator_for(None), 1);
        assert_eq!(policy.creator_for(Some(12)), 12);
    }

    #[test]
    fn test_category_allow_lists() {
        let policy = ImportPolicy::default();
        assert!(policy.accepts_project_type("INNOVATION"));
        assert!(!policy.accepts_project_type("hobby"));
        assert!(policy.accepts_skill_level("ADVANCED"));

        let open = ImportPolicy::permissive();
        assert!(open.accepts_project_type("hobby"));
        assert!(open.accepts_skill_level("expert"));
    }

    #[test]
    fn test_validate_rejects_blank_status() {
        let mut config = Config::default();
        config.import.default_status = " ".to_string();
        assert!(matches!(config.validate(), Err(ImportError::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_blank_tags_file_only_when_importing_tags() {
        let mut config = Config::default();
        config.input.tags_file = "  ".to_string();
        match config.validate() {
            Err(ImportError::Config { key, .. }) => assert_eq!(key, "input.tagsFile"),
            other => panic!("unexpected result: {other:?}"),
        }

        config.input.import_tags = false;
        assert!(config.validate().is_ok());
    }
}

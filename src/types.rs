//! Core record types: CSV source rows and persisted target rows.

use serde::{Deserialize, Serialize};

/// Required header columns of the projects file.
pub const PROJECT_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "institution",
    "projectType",
    "skillLevel",
];

/// Required header columns of the media file.
pub const MEDIA_COLUMNS: &[&str] = &["projectId", "url", "key", "type"];

/// Required header columns of the tags file. `projectId` is optional.
pub const TAG_COLUMNS: &[&str] = &["name"];

/// A project row as it appears in the source CSV.
///
/// Every field is optional at read time; required fields are enforced by
/// the parent stage so that a malformed row fails the stage, not the reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub institution: Option<String>,
    #[serde(rename = "projectType")]
    pub project_type: Option<String>,
    #[serde(rename = "skillLevel")]
    pub skill_level: Option<String>,
}

/// A media row referencing its project by original identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRow {
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
    pub url: Option<String>,
    pub key: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

/// A tag row, optionally associated with a project by original identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRow {
    pub name: Option<String>,
    #[serde(rename = "projectId", default)]
    pub project_id: Option<String>,
}

/// A project row that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProject {
    pub original_id: String,
    pub title: String,
    pub description: String,
    pub institution: String,
    pub project_type: String,
    pub skill_level: String,
}

/// A persisted `Project` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub institution: String,
    pub project_type: String,
    pub skill_level: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub creator_id: i64,
}

/// A persisted `Media` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub url: String,
    pub key: String,
    pub media_type: String,
    pub created_at: i64,
    pub project_id: i64,
}

/// A persisted `Tag` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
}

/// Trim a cell and treat blank values as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  101 ")), Some("101"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}

//! Project inserts and queries.

use super::Database;
use crate::types::{Project, ValidProject};
use rusqlite::{Connection, Row, params};

/// Derived column values applied to every imported project.
#[derive(Debug, Clone, Copy)]
pub struct ProjectDefaults<'a> {
    pub status: &'a str,
    pub creator_id: i64,
    pub now: i64,
}

/// Insert a project and return the identifier the store assigned.
pub fn insert_project(
    conn: &Connection,
    project: &ValidProject,
    defaults: ProjectDefaults<'_>,
) -> rusqlite::Result<i64> {
    conn.query_row(
        r#"INSERT INTO "Project" (
               "title", "description", "institution", "projectType", "skillLevel",
               "status", "createdAt", "updatedAt", "creatorId"
           )
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
           RETURNING "id""#,
        params![
            project.title,
            project.description,
            project.institution,
            project.project_type,
            project.skill_level,
            defaults.status,
            defaults.now,
            defaults.now,
            defaults.creator_id,
        ],
        |row| row.get(0),
    )
}

fn parse_project_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        institution: row.get("institution")?,
        project_type: row.get("projectType")?,
        skill_level: row.get("skillLevel")?,
        status: row.get("status")?,
        created_at: row.get("createdAt")?,
        updated_at: row.get("updatedAt")?,
        creator_id: row.get("creatorId")?,
    })
}

impl Database {
    /// All projects ordered by id.
    pub fn list_projects(&self) -> rusqlite::Result<Vec<Project>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(r#"SELECT * FROM "Project" ORDER BY "id""#)?;
            let projects = stmt
                .query_map([], parse_project_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(projects)
        })
    }

    /// Look up a single project.
    pub fn get_project(&self, id: i64) -> rusqlite::Result<Option<Project>> {
        self.with_conn(|conn| {
            match conn.query_row(
                r#"SELECT * FROM "Project" WHERE "id" = ?1"#,
                params![id],
                parse_project_row,
            ) {
                Ok(project) => Ok(Some(project)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ValidProject {
        ValidProject {
            original_id: "101".to_string(),
            title: "Solar Kiosk".to_string(),
            description: "Off-grid charging".to_string(),
            institution: "MIT".to_string(),
            project_type: "INNOVATION".to_string(),
            skill_level: "BEGINNER".to_string(),
        }
    }

    #[test]
    fn test_insert_project_returns_assigned_id() {
        let db = Database::open_in_memory().unwrap();
        let defaults = ProjectDefaults {
            status: "active",
            creator_id: 7,
            now: 1_700_000_000_000,
        };

        let first = db.with_conn(|c| insert_project(c, &sample(), defaults)).unwrap();
        let second = db.with_conn(|c| insert_project(c, &sample(), defaults)).unwrap();
        assert_eq!(second, first + 1);

        let stored = db.get_project(first).unwrap().unwrap();
        assert_eq!(stored.title, "Solar Kiosk");
        assert_eq!(stored.status, "active");
        assert_eq!(stored.creator_id, 7);
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[test]
    fn test_get_project_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_project(42).unwrap().is_none());
    }
}

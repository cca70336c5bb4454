//! Tag creation and project-tag association.

use super::Database;
use crate::types::Tag;
use rusqlite::{Connection, params};

/// Create the tag if no tag with this name exists, returning its id.
///
/// A `None` name is handed to the store unchanged and rejected there.
pub fn ensure_tag(conn: &Connection, name: Option<&str>, now: i64) -> rusqlite::Result<i64> {
    conn.execute(
        r#"INSERT INTO "Tag" ("name", "createdAt") VALUES (?1, ?2)
           ON CONFLICT ("name") DO NOTHING"#,
        params![name, now],
    )?;
    conn.query_row(
        r#"SELECT "id" FROM "Tag" WHERE "name" = ?1"#,
        params![name],
        |row| row.get(0),
    )
}

/// Associate a tag with a project. Returns false if the link already existed.
pub fn link_project_tag(conn: &Connection, project_id: i64, tag_id: i64) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        r#"INSERT OR IGNORE INTO "_ProjectToTag" ("A", "B") VALUES (?1, ?2)"#,
        params![project_id, tag_id],
    )?;
    Ok(inserted > 0)
}

impl Database {
    /// All tags ordered by id.
    pub fn list_tags(&self) -> rusqlite::Result<Vec<Tag>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(r#"SELECT "id", "name", "createdAt" FROM "Tag" ORDER BY "id""#)?;
            let tags = stmt
                .query_map([], |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tags)
        })
    }

    /// Tag names attached to a project, sorted.
    pub fn project_tag_names(&self, project_id: i64) -> rusqlite::Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT t."name" FROM "Tag" t
                   JOIN "_ProjectToTag" pt ON pt."B" = t."id"
                   WHERE pt."A" = ?1
                   ORDER BY t."name""#,
            )?;
            let names = stmt
                .query_map(params![project_id], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(names)
        })
    }
}

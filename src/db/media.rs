//! Media inserts and queries.

use super::Database;
use crate::types::{Media, MediaRow};
use rusqlite::{Connection, params};

/// Insert a media row under an already-remapped project id.
///
/// Attribute values are passed through as read; the store's NOT NULL and
/// foreign-key constraints decide whether the row is acceptable.
pub fn insert_media(
    conn: &Connection,
    row: &MediaRow,
    project_id: i64,
    now: i64,
) -> rusqlite::Result<i64> {
    conn.query_row(
        r#"INSERT INTO "Media" ("url", "key", "type", "createdAt", "projectId")
           VALUES (?1, ?2, ?3, ?4, ?5)
           RETURNING "id""#,
        params![row.url, row.key, row.media_type, now, project_id],
        |r| r.get(0),
    )
}

impl Database {
    /// All media ordered by id.
    pub fn list_media(&self) -> rusqlite::Result<Vec<Media>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT "id", "url", "key", "type", "createdAt", "projectId"
                   FROM "Media" ORDER BY "id""#,
            )?;
            let media = stmt
                .query_map([], |row| {
                    Ok(Media {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        key: row.get(2)?,
                        media_type: row.get(3)?,
                        created_at: row.get(4)?,
                        project_id: row.get(5)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(media)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(url: Option<&str>) -> MediaRow {
        MediaRow {
            project_id: Some("101".to_string()),
            url: url.map(String::from),
            key: Some("k1".to_string()),
            media_type: Some("image/png".to_string()),
        }
    }

    #[test]
    fn test_insert_media_rejects_unknown_project() {
        let db = Database::open_in_memory().unwrap();
        let result = db.with_conn(|c| insert_media(c, &media(Some("u1")), 999, 0));
        assert!(result.is_err());
        assert!(db.list_media().unwrap().is_empty());
    }

    #[test]
    fn test_insert_media_rejects_null_url() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|c| {
            c.execute(
                r#"INSERT INTO "Project" ("title", "description", "institution", "projectType",
                   "skillLevel", "createdAt", "updatedAt", "creatorId")
                   VALUES ('t', 'd', 'i', 'INNOVATION', 'BEGINNER', 0, 0, 1)"#,
                [],
            )
        })
        .unwrap();

        assert!(db.with_conn(|c| insert_media(c, &media(None), 1, 0)).is_err());
        let id = db.with_conn(|c| insert_media(c, &media(Some("u1")), 1, 5)).unwrap();

        let stored = db.list_media().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].project_id, 1);
        assert_eq!(stored[0].created_at, 5);
    }
}

//! Database layer for the import target store.

pub mod clear;
pub mod media;
pub mod projects;
pub mod tags;

use crate::error::{ImportError, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Where a connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Parse a connection string: a plain path, `sqlite://path`, `sqlite:path`,
    /// `file:path`, or `:memory:`.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ImportError::connection("connection string is empty"));
        }

        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);

        if path == ":memory:" {
            return Ok(Self::Memory);
        }

        if let Some((scheme, _)) = path.split_once("://") {
            return Err(ImportError::connection(format!(
                "unsupported database scheme '{}'",
                scheme
            )));
        }

        Ok(Self::File(PathBuf::from(path)))
    }
}

/// Database handle owning a single SQLite connection.
///
/// The pipeline is the only writer, so the connection is owned directly and
/// released when the handle is closed or dropped.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database named by a connection string.
    pub fn connect(url: &str) -> Result<Self> {
        match DatabaseLocation::parse(url)? {
            DatabaseLocation::Memory => Self::open_in_memory(),
            DatabaseLocation::File(path) => Self::open(path),
        }
    }

    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            ImportError::connection(format!("{}: {}", path.display(), e))
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .map_err(|e| ImportError::connection(e.to_string()))?;

        let mut db = Self { conn };
        db.run_migrations()?;
        debug!(path = %path.display(), "Opened database");

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| ImportError::connection(e.to_string()))?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| ImportError::connection(e.to_string()))?;

        let mut db = Self { conn };
        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations.
    fn run_migrations(&mut self) -> Result<()> {
        embedded::migrations::runner()
            .run(&mut self.conn)
            .map_err(|e| ImportError::connection(format!("schema migration failed: {}", e)))?;
        Ok(())
    }

    /// Execute a function with shared access to the connection.
    pub fn with_conn<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E>,
    {
        f(&self.conn)
    }

    /// Execute a function with mutable access to the connection (for transactions).
    pub fn with_conn_mut<F, T, E>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Connection) -> std::result::Result<T, E>,
    {
        f(&mut self.conn)
    }

    /// Close the connection, consuming the handle.
    pub fn close(self) {
        if let Err((_, e)) = self.conn.close() {
            warn!("Error while closing database connection: {}", e);
        } else {
            debug!("Database connection closed");
        }
    }

    /// Row count of a table (used for summaries and tests).
    pub fn count_rows(&self, table: &str) -> rusqlite::Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\"", table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        assert_eq!(
            DatabaseLocation::parse(":memory:").unwrap(),
            DatabaseLocation::Memory
        );
        assert_eq!(
            DatabaseLocation::parse("sqlite::memory:").unwrap(),
            DatabaseLocation::Memory
        );
        assert_eq!(
            DatabaseLocation::parse("sqlite://data/app.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("data/app.db"))
        );
        assert_eq!(
            DatabaseLocation::parse("./app.db").unwrap(),
            DatabaseLocation::File(PathBuf::from("./app.db"))
        );
    }

    #[test]
    fn test_parse_location_rejects_other_schemes() {
        let err = DatabaseLocation::parse("postgresql://user@localhost/db").unwrap_err();
        assert!(matches!(err, ImportError::Connection { .. }));
        assert!(DatabaseLocation::parse("  ").is_err());
    }

    #[test]
    fn test_open_in_memory_applies_schema() {
        let db = Database::open_in_memory().unwrap();
        for table in ["Project", "Media", "Tag", "_ProjectToTag"] {
            assert_eq!(db.count_rows(table).unwrap(), 0, "table {}", table);
        }
    }

    #[test]
    fn test_open_missing_directory_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("app.db");
        let err = Database::open(&path).err().unwrap();
        assert!(matches!(err, ImportError::Connection { .. }));
    }
}

//! Removal of previously imported data.

use super::Database;
use std::collections::BTreeMap;

/// Tables written by an import, parents first.
pub const IMPORT_TABLES: &[&str] = &["Project", "Tag", "Media", "_ProjectToTag"];

impl Database {
    /// Delete all imported rows in one transaction.
    ///
    /// Tables are deleted in reverse order (children before parents) so
    /// foreign keys hold at every step.
    ///
    /// # Returns
    /// A map of table names to number of rows deleted.
    pub fn clear_imported_data(&mut self) -> rusqlite::Result<BTreeMap<String, usize>> {
        let mut deleted = BTreeMap::new();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            for table_name in IMPORT_TABLES.iter().rev() {
                let count = tx.execute(&format!("DELETE FROM \"{}\"", table_name), [])?;
                if count > 0 {
                    deleted.insert(table_name.to_string(), count);
                }
            }

            tx.commit()
        })?;

        Ok(deleted)
    }
}

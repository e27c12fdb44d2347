//! Category operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Category;

impl Database {
    /// Add a category, returning the existing id if the name is taken
    pub fn add_category(&self, name: &str) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute("INSERT INTO categories (name) VALUES (?)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// Look up a category by name
    pub fn find_category(&self, name: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, name, created_at FROM categories WHERE name = ?",
                params![name],
                Self::row_to_category,
            )
            .optional()?)
    }

    /// List all categories
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Delete a category; referencing transactions and recurring definitions
    /// fall back to uncategorized, rules referencing it are removed
    pub fn delete_category(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("category {}", id)));
        }
        Ok(())
    }

    fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
        let created_at_str: String = row.get(2)?;
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}

//! Auto-categorization rule operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{CategoryRule, RuleField};

impl Database {
    /// Add a rule, skipping creation if an identical (pattern, field,
    /// category) rule already exists
    ///
    /// Returns `None` for a duplicate. The pattern is stored lowercased;
    /// evaluation order is insertion order.
    pub fn add_rule(
        &self,
        pattern: &str,
        field: RuleField,
        category_id: i64,
    ) -> Result<Option<i64>> {
        let pattern = pattern.to_lowercase();
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM category_rules WHERE pattern = ? AND field = ? AND category_id = ?",
                params![pattern, field.as_str(), category_id],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Ok(None);
        }

        conn.execute(
            "INSERT INTO category_rules (pattern, field, category_id) VALUES (?, ?, ?)",
            params![pattern, field.as_str(), category_id],
        )?;
        Ok(Some(conn.last_insert_rowid()))
    }

    /// List rules in evaluation order (insertion order)
    pub fn list_rules(&self) -> Result<Vec<CategoryRule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, pattern, field, category_id, created_at FROM category_rules ORDER BY id",
        )?;
        let rules = stmt
            .query_map([], Self::row_to_rule)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    /// Delete a rule
    pub fn delete_rule(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM category_rules WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("rule {}", id)));
        }
        Ok(())
    }

    fn row_to_rule(row: &Row<'_>) -> rusqlite::Result<CategoryRule> {
        let field_str: String = row.get(2)?;
        let created_at_str: String = row.get(4)?;
        Ok(CategoryRule {
            id: row.get(0)?,
            pattern: row.get(1)?,
            field: field_str.parse().unwrap_or(RuleField::Label),
            category_id: row.get(3)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}

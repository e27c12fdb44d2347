//! Recurring transaction definition operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::RecurringTransaction;

impl Database {
    /// Add a recurring transaction definition
    pub fn add_recurring(
        &self,
        label: &str,
        amount: f64,
        day_of_month: u32,
        category_id: Option<i64>,
        account_id: Option<i64>,
    ) -> Result<i64> {
        if !(1..=31).contains(&day_of_month) {
            return Err(Error::InvalidData(format!(
                "day_of_month must be 1-31, got {}",
                day_of_month
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO recurring_transactions (label, amount, day_of_month, category_id, account_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![label, amount, day_of_month, category_id, account_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a single recurring definition by id
    pub fn get_recurring(&self, id: i64) -> Result<RecurringTransaction> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM recurring_transactions WHERE id = ?",
                RECURRING_COLUMNS
            ),
            params![id],
            Self::row_to_recurring,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("recurring transaction {}", id)))
    }

    /// List recurring definitions, optionally only active ones
    pub fn list_recurring(&self, active_only: bool) -> Result<Vec<RecurringTransaction>> {
        let conn = self.conn()?;
        let sql = if active_only {
            format!(
                "SELECT {} FROM recurring_transactions WHERE active = 1 ORDER BY id",
                RECURRING_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM recurring_transactions ORDER BY id",
                RECURRING_COLUMNS
            )
        };
        let mut stmt = conn.prepare(&sql)?;
        let recurring = stmt
            .query_map([], Self::row_to_recurring)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(recurring)
    }

    /// Activate or deactivate a recurring definition
    pub fn set_recurring_active(&self, id: i64, active: bool) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE recurring_transactions SET active = ? WHERE id = ?",
            params![active, id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("recurring transaction {}", id)));
        }
        Ok(())
    }

    /// Delete a recurring definition
    pub fn delete_recurring(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM recurring_transactions WHERE id = ?",
            params![id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("recurring transaction {}", id)));
        }
        Ok(())
    }

    fn row_to_recurring(row: &Row<'_>) -> rusqlite::Result<RecurringTransaction> {
        let created_at_str: String = row.get(7)?;
        let day: i64 = row.get(3)?;
        Ok(RecurringTransaction {
            id: row.get(0)?,
            label: row.get(1)?,
            amount: row.get(2)?,
            day_of_month: day as u32,
            active: row.get(4)?,
            category_id: row.get(5)?,
            account_id: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}

const RECURRING_COLUMNS: &str =
    "id, label, amount, day_of_month, active, category_id, account_id, created_at";

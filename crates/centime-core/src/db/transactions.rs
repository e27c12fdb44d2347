//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction};

/// First and one-past-last day of a month, for range queries
pub(crate) fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 1, 1).expect("valid date"));
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("valid date")
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).expect("valid date")
    };
    (start, end)
}

impl Database {
    /// Insert a transaction, skipping duplicates on external_id
    ///
    /// Returns `None` when a transaction with the same external id already
    /// exists (the idempotency contract for imports). Transactions without
    /// an external id are always inserted.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Option<i64>> {
        let conn = self.conn()?;

        if let Some(ref ext_id) = tx.external_id {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE external_id = ?",
                    params![ext_id],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Ok(None); // Duplicate, skip
            }
        }

        conn.execute(
            r#"
            INSERT INTO transactions (account_id, date, label, merchant, amount, category_id, manual, external_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.account_id,
                tx.date.to_string(),
                tx.label,
                tx.merchant,
                tx.amount,
                tx.category_id,
                tx.manual,
                tx.external_id,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Look up a transaction by its provider external id
    pub fn find_transaction_by_external_id(&self, external_id: &str) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE external_id = ?",
                    TRANSACTION_COLUMNS
                ),
                params![external_id],
                Self::row_to_transaction,
            )
            .optional()?)
    }

    /// Get a single transaction by id
    pub fn get_transaction(&self, id: i64) -> Result<Transaction> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
            params![id],
            Self::row_to_transaction,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// List transactions, newest first, optionally scoped to one account
    pub fn list_transactions(
        &self,
        account_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let (sql, params_vec): (String, Vec<Box<dyn rusqlite::ToSql>>) =
            if let Some(aid) = account_id {
                (
                    format!(
                        "SELECT {} FROM transactions WHERE account_id = ? \
                         ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
                        TRANSACTION_COLUMNS
                    ),
                    vec![Box::new(aid), Box::new(limit), Box::new(offset)],
                )
            } else {
                (
                    format!(
                        "SELECT {} FROM transactions ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
                        TRANSACTION_COLUMNS
                    ),
                    vec![Box::new(limit), Box::new(offset)],
                )
            };

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let transactions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// All transactions dated within the given month
    pub fn transactions_in_month(&self, year: i32, month: u32) -> Result<Vec<Transaction>> {
        let (start, end) = month_bounds(year, month);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE date >= ? AND date < ? ORDER BY date, id",
            TRANSACTION_COLUMNS
        ))?;
        let transactions = stmt
            .query_map(
                params![start.to_string(), end.to_string()],
                Self::row_to_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Transactions with no category assigned, for batch rule application
    pub fn uncategorized_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE category_id IS NULL ORDER BY id",
            TRANSACTION_COLUMNS
        ))?;
        let transactions = stmt
            .query_map([], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Assign (or clear) a transaction's category
    pub fn set_transaction_category(&self, id: i64, category_id: Option<i64>) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE transactions SET category_id = ? WHERE id = ?",
            params![category_id, id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        Ok(())
    }

    /// Delete a transaction
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        Ok(())
    }

    pub(crate) fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(2)?;
        let created_at_str: String = row.get(9)?;

        Ok(Transaction {
            id: row.get(0)?,
            account_id: row.get(1)?,
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            label: row.get(3)?,
            merchant: row.get(4)?,
            amount: row.get(5)?,
            category_id: row.get(6)?,
            manual: row.get(7)?,
            external_id: row.get(8)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, account_id, date, label, merchant, amount, category_id, manual, external_id, created_at";

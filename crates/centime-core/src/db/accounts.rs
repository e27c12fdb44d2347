//! Bank account operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{AccountKind, BankAccount};

impl Database {
    /// Add a manual bank account
    pub fn add_account(
        &self,
        name: &str,
        institution: &str,
        kind: Option<AccountKind>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO accounts (name, institution, kind, manual) VALUES (?, ?, ?, 1)",
            params![name, institution, kind.map(|k| k.as_str())],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Add an account connected to an Enable Banking session
    pub fn add_connected_account(
        &self,
        name: &str,
        institution: &str,
        session_id: &str,
        account_uid: &str,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO accounts (name, institution, manual, provider_session_id, provider_account_uid)
            VALUES (?, ?, 0, ?, ?)
            "#,
            params![name, institution, session_id, account_uid],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a single account by id
    pub fn get_account(&self, id: i64) -> Result<BankAccount> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS),
            params![id],
            Self::row_to_account,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("account {}", id)))
    }

    /// List all accounts
    pub fn list_accounts(&self) -> Result<Vec<BankAccount>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts ORDER BY id",
            ACCOUNT_COLUMNS
        ))?;
        let accounts = stmt
            .query_map([], Self::row_to_account)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    /// List accounts eligible for a sync pass (connected, non-manual)
    pub fn list_connected_accounts(&self) -> Result<Vec<BankAccount>> {
        Ok(self
            .list_accounts()?
            .into_iter()
            .filter(|a| a.is_connected())
            .collect())
    }

    /// Delete an account; its transactions and recurring definitions cascade
    pub fn delete_account(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM accounts WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("account {}", id)));
        }
        Ok(())
    }

    /// Apply a freshly fetched balance
    pub fn update_account_balance(&self, id: i64, balance: f64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE accounts SET balance = ? WHERE id = ?",
            params![balance, id],
        )?;
        Ok(())
    }

    /// Record the outcome of a sync attempt for one account
    ///
    /// The error column always reflects the most recent pass: a successful
    /// pass clears any previous error.
    pub fn record_account_sync(
        &self,
        id: i64,
        synced_at: DateTime<Utc>,
        error: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE accounts SET last_synced_at = ?, last_sync_error = ? WHERE id = ?",
            params![synced_at.format("%Y-%m-%d %H:%M:%S").to_string(), error, id],
        )?;
        Ok(())
    }

    fn row_to_account(row: &Row<'_>) -> rusqlite::Result<BankAccount> {
        let kind_str: Option<String> = row.get(3)?;
        let last_synced_str: Option<String> = row.get(8)?;
        let created_at_str: String = row.get(10)?;

        Ok(BankAccount {
            id: row.get(0)?,
            name: row.get(1)?,
            institution: row.get(2)?,
            kind: kind_str.and_then(|s| s.parse().ok()),
            balance: row.get(4)?,
            provider_session_id: row.get(5)?,
            provider_account_uid: row.get(6)?,
            manual: row.get(7)?,
            last_synced_at: last_synced_str.map(|s| parse_datetime(&s)),
            last_sync_error: row.get(9)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}

const ACCOUNT_COLUMNS: &str = "id, name, institution, kind, balance, provider_session_id, \
     provider_account_uid, manual, last_synced_at, last_sync_error, created_at";

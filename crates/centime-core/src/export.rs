//! CSV export
//!
//! Semicolon-delimited export of the transaction ledger. Fields containing
//! the delimiter, quotes or newlines are quoted with doubled inner quotes.

use std::collections::HashMap;

use tracing::info;

use crate::db::Database;
use crate::error::Result;

const HEADER: &str = "Date;Label;Merchant;Amount;Category;Account;Type;ExternalID";

/// Render every transaction (optionally scoped to one account) as CSV
///
/// Rows come out newest first, matching the transaction listing order.
pub fn export_csv(db: &Database, account_id: Option<i64>) -> Result<String> {
    let categories: HashMap<i64, String> = db
        .list_categories()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let accounts: HashMap<i64, String> = db
        .list_accounts()?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();

    let transactions = db.list_transactions(account_id, i64::MAX, 0)?;
    let mut out = String::with_capacity(64 * (transactions.len() + 1));
    out.push_str(HEADER);
    out.push('\n');

    for tx in &transactions {
        let category = tx
            .category_id
            .and_then(|id| categories.get(&id))
            .map(String::as_str)
            .unwrap_or("");
        let account = tx
            .account_id
            .and_then(|id| accounts.get(&id))
            .map(String::as_str)
            .unwrap_or("");
        let kind = if tx.manual { "manual" } else { "imported" };

        let row = [
            tx.date.format("%Y-%m-%d").to_string(),
            escape(&tx.label),
            escape(tx.merchant.as_deref().unwrap_or("")),
            format!("{:.2}", tx.amount),
            escape(category),
            escape(account),
            kind.to_string(),
            escape(tx.external_id.as_deref().unwrap_or("")),
        ];
        out.push_str(&row.join(";"));
        out.push('\n');
    }

    info!("Exported {} transactions", transactions.len());
    Ok(out)
}

/// Quote a field when it contains the delimiter, a quote or a newline
fn escape(field: &str) -> String {
    if field.contains(';') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

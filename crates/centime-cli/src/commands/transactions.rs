//! Transaction commands (list, add, set-category)

use std::collections::HashMap;

use anyhow::{Context, Result};
use centime_core::db::Database;
use centime_core::models::NewTransaction;
use chrono::{NaiveDate, Utc};

pub fn cmd_tx_list(db: &Database, limit: i64, account_id: Option<i64>) -> Result<()> {
    let transactions = db.list_transactions(account_id, limit, 0)?;
    if transactions.is_empty() {
        println!("No transactions.");
        return Ok(());
    }

    let categories: HashMap<i64, String> = db
        .list_categories()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    println!();
    println!(
        "{:>6}  {:<10} {:<36} {:>10}  {}",
        "ID", "Date", "Label", "Amount", "Category"
    );
    println!("   ─────────────────────────────────────────────────────────────────────");
    for tx in transactions {
        let category = tx
            .category_id
            .and_then(|id| categories.get(&id).cloned())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>6}  {:<10} {:<36} {:>10.2}  {}",
            tx.id,
            tx.date,
            super::truncate(&tx.label, 36),
            tx.amount,
            category
        );
    }
    println!();
    Ok(())
}

pub fn cmd_tx_add(
    db: &Database,
    label: &str,
    amount: f64,
    date: Option<&str>,
    account_id: Option<i64>,
    category: Option<&str>,
) -> Result<()> {
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --date format (use YYYY-MM-DD)")?,
        None => Utc::now().date_naive(),
    };
    let category_id = category.map(|name| db.add_category(name)).transpose()?;

    let id = db
        .insert_transaction(&NewTransaction {
            account_id,
            date,
            label: label.to_string(),
            merchant: None,
            amount,
            category_id,
            manual: true,
            external_id: None,
        })?
        .context("Transaction was not inserted")?;

    println!("✅ Added transaction {} ({} {:.2})", id, label, amount);
    Ok(())
}

pub fn cmd_tx_set_category(db: &Database, id: i64, category: &str) -> Result<()> {
    let category_id = db.add_category(category)?;
    db.set_transaction_category(id, Some(category_id))?;
    println!("✅ Transaction {} → {}", id, category);
    Ok(())
}

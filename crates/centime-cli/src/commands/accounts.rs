//! Account management commands

use anyhow::{bail, Result};
use centime_core::db::Database;
use centime_core::models::AccountKind;

pub fn cmd_accounts_list(db: &Database) -> Result<()> {
    let accounts = db.list_accounts()?;
    if accounts.is_empty() {
        println!("No accounts. Add one with 'centime accounts add NAME'.");
        return Ok(());
    }

    println!();
    println!(
        "{:>4}  {:<24} {:<16} {:>12}  {}",
        "ID", "Name", "Institution", "Balance", "Kind"
    );
    println!("   ─────────────────────────────────────────────────────────────");
    for account in accounts {
        let kind = account
            .kind
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string());
        let link = if account.is_connected() { " 🔗" } else { "" };
        println!(
            "{:>4}  {:<24} {:<16} {:>12.2}  {}{}",
            account.id,
            super::truncate(&account.name, 24),
            super::truncate(&account.institution, 16),
            account.balance,
            kind,
            link
        );
    }
    println!();
    Ok(())
}

pub fn cmd_accounts_add(
    db: &Database,
    name: &str,
    institution: &str,
    kind: Option<&str>,
) -> Result<()> {
    let kind = match kind {
        Some(s) => match s.parse::<AccountKind>() {
            Ok(k) => Some(k),
            Err(e) => bail!("{} (use checking, savings or credit)", e),
        },
        None => None,
    };

    let id = db.add_account(name, institution, kind)?;
    println!("✅ Added account '{}' (id {})", name, id);
    Ok(())
}

pub fn cmd_accounts_remove(db: &Database, id: i64) -> Result<()> {
    let account = db.get_account(id)?;
    db.delete_account(id)?;
    println!(
        "🗑️  Removed account '{}' and its transactions",
        account.name
    );
    Ok(())
}

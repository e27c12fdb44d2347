//! Recurring definition commands (add, generate, check-missing)

use anyhow::{Context, Result};
use centime_core::db::Database;
use centime_core::recurring;
use chrono::{Datelike, Utc};

/// Parse a YYYY-MM month argument, defaulting to the current month
pub fn resolve_month(month: Option<&str>) -> Result<(i32, u32)> {
    match month {
        Some(s) => {
            let (year, month) = s
                .split_once('-')
                .context("Invalid --month format (use YYYY-MM)")?;
            let year: i32 = year.parse().context("Invalid year in --month")?;
            let month: u32 = month.parse().context("Invalid month in --month")?;
            if !(1..=12).contains(&month) {
                anyhow::bail!("Month must be 1-12, got {}", month);
            }
            Ok((year, month))
        }
        None => {
            let today = Utc::now().date_naive();
            Ok((today.year(), today.month()))
        }
    }
}

pub fn cmd_recurring_list(db: &Database, include_inactive: bool) -> Result<()> {
    let definitions = db.list_recurring(!include_inactive)?;
    if definitions.is_empty() {
        println!("No recurring definitions.");
        return Ok(());
    }

    println!();
    println!(
        "{:>4}  {:<28} {:>10}  {:>4}  {}",
        "ID", "Label", "Amount", "Day", "Active"
    );
    println!("   ──────────────────────────────────────────────────────");
    for def in definitions {
        println!(
            "{:>4}  {:<28} {:>10.2}  {:>4}  {}",
            def.id,
            super::truncate(&def.label, 28),
            def.amount,
            def.day_of_month,
            if def.active { "yes" } else { "no" }
        );
    }
    println!();
    Ok(())
}

pub fn cmd_recurring_add(
    db: &Database,
    label: &str,
    amount: f64,
    day: u32,
    category: Option<&str>,
    account_id: Option<i64>,
) -> Result<()> {
    let category_id = category.map(|name| db.add_category(name)).transpose()?;
    let id = db.add_recurring(label, amount, day, category_id, account_id)?;
    println!(
        "✅ Recurring '{}' ({:.2} on day {}) added (id {})",
        label, amount, day, id
    );
    Ok(())
}

pub fn cmd_recurring_set_active(db: &Database, id: i64, active: bool) -> Result<()> {
    db.set_recurring_active(id, active)?;
    println!(
        "✅ Recurring {} {}",
        id,
        if active { "enabled" } else { "disabled" }
    );
    Ok(())
}

pub fn cmd_recurring_remove(db: &Database, id: i64) -> Result<()> {
    db.delete_recurring(id)?;
    println!("🗑️  Removed recurring {}", id);
    Ok(())
}

pub fn cmd_recurring_generate(db: &Database, month: Option<&str>) -> Result<()> {
    let (year, month) = resolve_month(month)?;
    let generated = recurring::generate_for_month(db, year, month)?;
    if generated == 0 {
        println!("Nothing to generate for {}-{:02}.", year, month);
    } else {
        println!(
            "✅ Generated {} transactions for {}-{:02}",
            generated, year, month
        );
    }
    Ok(())
}

pub fn cmd_recurring_check_missing(db: &Database, month: Option<&str>) -> Result<()> {
    let (year, month) = resolve_month(month)?;
    let today = Utc::now().date_naive();
    let missing = recurring::check_missing(db, year, month, today)?;

    if missing.is_empty() {
        println!("✅ No missing recurring transactions for {}-{:02}", year, month);
        return Ok(());
    }

    println!();
    println!("⚠️  {} missing for {}-{:02}:", missing.len(), year, month);
    for item in missing {
        println!(
            "   {} ({:.2}) expected on {}",
            item.definition.label, item.definition.amount, item.due_date
        );
    }
    println!();
    Ok(())
}

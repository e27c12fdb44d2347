//! Auto-categorization rule commands

use std::collections::HashMap;

use anyhow::{bail, Result};
use centime_core::categorize;
use centime_core::db::Database;
use centime_core::models::RuleField;

pub fn cmd_rules_list(db: &Database) -> Result<()> {
    let rules = db.list_rules()?;
    if rules.is_empty() {
        println!("No rules. Add one with 'centime rules add PATTERN CATEGORY'.");
        return Ok(());
    }

    let categories: HashMap<i64, String> = db
        .list_categories()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    println!();
    println!("{:>4}  {:<28} {:<14} {}", "ID", "Pattern", "Field", "Category");
    println!("   ──────────────────────────────────────────────────────");
    for rule in rules {
        let category = categories
            .get(&rule.category_id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", rule.category_id));
        println!(
            "{:>4}  {:<28} {:<14} {}",
            rule.id,
            super::truncate(&rule.pattern, 28),
            rule.field,
            category
        );
    }
    println!();
    Ok(())
}

pub fn cmd_rules_add(db: &Database, pattern: &str, category: &str, field: &str) -> Result<()> {
    let field = match field.parse::<RuleField>() {
        Ok(f) => f,
        Err(e) => bail!("{} (use merchant or label)", e),
    };
    let category_id = db.add_category(category)?;

    match db.add_rule(pattern, field, category_id)? {
        Some(id) => println!("✅ Rule {} → '{}' added (id {})", pattern, category, id),
        None => println!("Rule already exists, nothing added."),
    }
    Ok(())
}

pub fn cmd_rules_from_tx(db: &Database, transaction_id: i64, category: &str) -> Result<()> {
    let category_id = db.add_category(category)?;
    match categorize::create_rule_from_transaction(db, transaction_id, category_id)? {
        Some(id) => println!("✅ Rule derived from transaction {} (id {})", transaction_id, id),
        None => println!("An identical rule already exists, nothing added."),
    }
    Ok(())
}

pub fn cmd_rules_remove(db: &Database, id: i64) -> Result<()> {
    db.delete_rule(id)?;
    println!("🗑️  Removed rule {}", id);
    Ok(())
}

pub fn cmd_rules_apply(db: &Database) -> Result<()> {
    let applied = categorize::apply_rules(db)?;
    if applied == 0 {
        println!("No uncategorized transactions matched a rule.");
    } else {
        println!("✅ Categorized {} transactions", applied);
    }
    Ok(())
}

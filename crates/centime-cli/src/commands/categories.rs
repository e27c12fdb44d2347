//! Category management commands

use anyhow::Result;
use centime_core::db::Database;

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let categories = db.list_categories()?;
    if categories.is_empty() {
        println!("No categories. Add one with 'centime categories add NAME'.");
        return Ok(());
    }

    println!();
    for category in categories {
        println!("{:>4}  {}", category.id, category.name);
    }
    println!();
    Ok(())
}

pub fn cmd_categories_add(db: &Database, name: &str) -> Result<()> {
    let id = db.add_category(name)?;
    println!("✅ Category '{}' (id {})", name, id);
    Ok(())
}

pub fn cmd_categories_remove(db: &Database, id: i64) -> Result<()> {
    db.delete_category(id)?;
    println!("🗑️  Removed category {}; its transactions are now uncategorized", id);
    Ok(())
}

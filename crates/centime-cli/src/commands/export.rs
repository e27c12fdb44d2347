//! CSV export command

use std::path::Path;

use anyhow::{Context, Result};
use centime_core::db::Database;
use centime_core::export::export_csv;

pub fn cmd_export(db: &Database, output: Option<&Path>, account_id: Option<i64>) -> Result<()> {
    let csv = export_csv(db, account_id)?;

    match output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            // Minus the header line
            let rows = csv.lines().count().saturating_sub(1);
            println!("✅ Exported {} transactions to {}", rows, path.display());
        }
        None => print!("{}", csv),
    }
    Ok(())
}

//! Bank synchronization command

use anyhow::Result;
use centime_core::credentials::CredentialStore;
use centime_core::db::Database;
use centime_core::sync::SyncService;
use centime_core::EnableBankingClient;

pub async fn cmd_sync(db: &Database) -> Result<()> {
    let connected = db.list_connected_accounts()?;
    if connected.is_empty() {
        println!("No connected accounts. Run 'centime bank connect' first.");
        return Ok(());
    }

    let store = CredentialStore::open()?;
    let client = EnableBankingClient::from_credentials(&store)?;

    println!("🔄 Syncing {} accounts...", connected.len());
    let service = SyncService::new();
    let report = service.sync_all(db, &client).await?;

    println!();
    println!("📊 Sync Results");
    println!("   ─────────────────────────────");
    println!("   Accounts synced: {}", report.accounts_synced);
    println!("   Imported: {}", report.stats.imported);
    println!("   Duplicates skipped: {}", report.stats.duplicates);
    if report.stats.skipped > 0 {
        println!("   Pending/unusable skipped: {}", report.stats.skipped);
    }

    if !report.errors.is_empty() {
        println!();
        println!("⚠️  {} accounts failed:", report.errors.len());
        for (account, message) in &report.errors {
            println!("   {}: {}", account, message);
        }
    }

    Ok(())
}

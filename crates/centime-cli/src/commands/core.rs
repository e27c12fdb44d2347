//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show database, credential and sync state

use std::path::Path;

use anyhow::{Context, Result};
use centime_core::credentials::{CredentialStore, APP_ID_KEY, PRIVATE_KEY_KEY};
use centime_core::db::{Database, DB_KEY_ENV};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Save your bank credentials: centime bank setup --app-id ID --key-file key.pem");
    println!("  2. Connect an account: centime bank connect --institution NAME --country XX");
    println!("  3. Synchronize: centime sync");

    Ok(())
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Centime Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    // Banking credentials
    match CredentialStore::open() {
        Ok(store) => {
            let configured =
                store.read(APP_ID_KEY).is_some() && store.read(PRIVATE_KEY_KEY).is_some();
            if configured {
                println!("   🏦 Bank credentials: configured");
            } else {
                println!("   🏦 Bank credentials: not configured (run 'centime bank setup')");
            }
        }
        Err(e) => println!("   🏦 Bank credentials: unavailable ({})", e),
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                let accounts = db.list_accounts()?;
                let transactions = db.list_transactions(None, i64::MAX, 0)?;
                println!();
                println!("   Accounts: {}", accounts.len());
                println!("   Transactions: {}", transactions.len());
                println!("   Categories: {}", db.list_categories()?.len());
                println!("   Recurring: {}", db.list_recurring(true)?.len());

                for account in accounts.iter().filter(|a| a.is_connected()) {
                    match (&account.last_sync_error, &account.last_synced_at) {
                        (Some(error), _) => {
                            println!("   ❌ {}: last sync failed ({})", account.name, error)
                        }
                        (None, Some(at)) => println!(
                            "   ✅ {}: synced {}",
                            account.name,
                            at.format("%Y-%m-%d %H:%M")
                        ),
                        (None, None) => println!("   ⏳ {}: never synced", account.name),
                    }
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

//! Enable Banking credential and connection commands

use std::path::Path;

use anyhow::{Context, Result};
use centime_core::banking::{BankingProvider, EnableBankingClient};
use centime_core::credentials::{CredentialStore, APP_ID_KEY, PRIVATE_KEY_KEY};
use centime_core::db::Database;

/// Accept either a raw authorization code or the full redirect URL the
/// browser landed on, and recover the code
pub fn extract_authorization_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some((_, query)) = input.split_once('?') {
        // Drop any fragment before walking the query parameters
        let query = query.split('#').next().unwrap_or(query);
        for pair in query.split('&') {
            if let Some(value) = pair.strip_prefix("code=") {
                if value.is_empty() {
                    return None;
                }
                return Some(value.to_string());
            }
        }
        return None;
    }

    Some(input.to_string())
}

pub fn cmd_bank_setup(app_id: &str, key_file: &Path) -> Result<()> {
    let pem = std::fs::read_to_string(key_file)
        .with_context(|| format!("Failed to read key file {}", key_file.display()))?;
    if !pem.contains("PRIVATE KEY") {
        anyhow::bail!(
            "{} does not look like a PEM private key",
            key_file.display()
        );
    }

    let store = CredentialStore::open()?;
    store.save(APP_ID_KEY, app_id)?;
    store.save(PRIVATE_KEY_KEY, &pem)?;

    println!("✅ Credentials saved");
    println!("   Next: centime bank institutions --country XX");
    Ok(())
}

pub fn cmd_bank_reset() -> Result<()> {
    let store = CredentialStore::open()?;
    store.delete(APP_ID_KEY)?;
    store.delete(PRIVATE_KEY_KEY)?;
    println!("🗑️  Credentials removed");
    Ok(())
}

pub async fn cmd_bank_institutions(country: &str) -> Result<()> {
    let store = CredentialStore::open()?;
    let client = EnableBankingClient::from_credentials(&store)?;

    let institutions = client.list_institutions(country).await?;
    if institutions.is_empty() {
        println!("No institutions available for '{}'.", country);
        return Ok(());
    }

    println!();
    println!("🏦 {} institutions in {}:", institutions.len(), country);
    for institution in institutions {
        println!("   {}", institution.name);
    }
    println!();
    Ok(())
}

pub async fn cmd_bank_connect(
    institution: &str,
    country: &str,
    redirect_url: &str,
) -> Result<()> {
    let store = CredentialStore::open()?;
    let client = EnableBankingClient::from_credentials(&store)?;

    let url = client
        .start_authorization(institution, country, redirect_url)
        .await?;

    println!();
    println!("🔑 Open this URL in your browser and authorize access:");
    println!();
    println!("   {}", url);
    println!();
    println!("Afterwards, finish with:");
    println!("   centime bank session <CODE-OR-REDIRECT-URL> --institution \"{}\"", institution);
    Ok(())
}

pub async fn cmd_bank_session(db: &Database, code: &str, institution: &str) -> Result<()> {
    let code = extract_authorization_code(code)
        .context("No authorization code found in the input")?;

    let store = CredentialStore::open()?;
    let client = EnableBankingClient::from_credentials(&store)?;

    let session = client.create_session(&code).await?;
    println!("✅ Session {} created", session.session_id);

    for account in &session.accounts {
        // The details call can give a nicer name; fall back to what the
        // session already carries
        let name = match client.get_account_details(&account.uid).await {
            Ok(details) => details.name.unwrap_or_else(|| account.display_name()),
            Err(_) => account.display_name(),
        };

        let id = db.add_connected_account(&name, institution, &session.session_id, &account.uid)?;
        println!("   Linked account '{}' (id {})", name, id);
    }

    println!();
    println!("Run 'centime sync' to import transactions.");
    Ok(())
}

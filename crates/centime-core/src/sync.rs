//! Bank synchronization orchestrator
//!
//! Walks the connected accounts sequentially: refresh the balance
//! (best-effort), then fetch and import transaction pages. One account
//! failing never stops the pass; the error is recorded on the account and
//! surfaced in the report, and the pass moves on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{info, warn};

use crate::banking::BankingProvider;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::import::{self, ImportStats};
use crate::models::BankAccount;

/// Result of one full synchronization pass
#[derive(Debug, Default)]
pub struct SyncReport {
    pub accounts_synced: i64,
    pub accounts_failed: i64,
    pub stats: ImportStats,
    /// Account name and error message for each failed account
    pub errors: Vec<(String, String)>,
}

/// Observable state of the synchronizer
///
/// Observation only: callers that want to prevent overlapping passes check
/// `is_syncing` themselves before starting one.
#[derive(Debug, Default)]
pub struct SyncStatus {
    syncing: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl SyncStatus {
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Most recent error message from any pass, if any
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|e| e.clone())
    }

    fn begin(&self) {
        self.syncing.store(true, Ordering::SeqCst);
    }

    fn finish(&self, error: Option<String>) {
        if let Ok(mut last) = self.last_error.lock() {
            if error.is_some() {
                *last = error;
            }
        }
        self.syncing.store(false, Ordering::SeqCst);
    }
}

/// Drives synchronization passes and tracks their status
#[derive(Debug, Default)]
pub struct SyncService {
    status: Arc<SyncStatus>,
}

impl SyncService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Arc<SyncStatus> {
        Arc::clone(&self.status)
    }

    /// Synchronize every connected account
    pub async fn sync_all(
        &self,
        db: &Database,
        provider: &dyn BankingProvider,
    ) -> Result<SyncReport> {
        let accounts = db.list_connected_accounts()?;
        info!("Starting sync pass over {} accounts", accounts.len());

        self.status.begin();
        let mut report = SyncReport::default();

        for account in &accounts {
            match self.sync_account(db, provider, account).await {
                Ok(stats) => {
                    db.record_account_sync(account.id, Utc::now(), None)?;
                    report.accounts_synced += 1;
                    report.stats.imported += stats.imported;
                    report.stats.duplicates += stats.duplicates;
                    report.stats.skipped += stats.skipped;
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!("Sync failed for account {}: {}", account.name, message);
                    db.record_account_sync(account.id, Utc::now(), Some(&message))?;
                    report.accounts_failed += 1;
                    report.errors.push((account.name.clone(), message));
                }
            }
        }

        let pass_error = report.errors.last().map(|(_, m)| m.clone());
        self.status.finish(pass_error);

        info!(
            "Sync pass done: {} accounts ok, {} failed, {} imported, {} duplicates",
            report.accounts_synced,
            report.accounts_failed,
            report.stats.imported,
            report.stats.duplicates
        );
        Ok(report)
    }

    async fn sync_account(
        &self,
        db: &Database,
        provider: &dyn BankingProvider,
        account: &BankAccount,
    ) -> Result<ImportStats> {
        let uid = account
            .provider_account_uid
            .as_deref()
            .ok_or_else(|| Error::InvalidData(format!("Account {} has no provider link", account.id)))?;

        // Balance refresh is best-effort; a failure here must not block
        // the transaction import below
        match provider.get_account_balances(uid).await {
            Ok(balances) => {
                if let Some(balance) = balances.iter().find_map(|b| b.amount()) {
                    db.update_account_balance(account.id, balance)?;
                }
            }
            Err(e) => warn!("Balance refresh failed for {}: {}", account.name, e),
        }

        let mut stats = ImportStats::default();
        let mut continuation_key: Option<String> = None;
        loop {
            let page = provider
                .get_account_transactions(uid, continuation_key.as_deref())
                .await?;
            for tx in &page.transactions {
                let outcome = import::import_transaction(db, account.id, tx)?;
                stats.record(&outcome);
            }
            match page.continuation_key {
                Some(key) => continuation_key = Some(key),
                None => break,
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::types::{ProviderAmount, ProviderBalance, ProviderTransaction};
    use crate::banking::{AccountDetails, Institution, Session, TransactionsPage};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Scripted provider: transaction pages keyed by account uid, with
    /// continuation keys indexing into the page list
    #[derive(Default)]
    struct ScriptedProvider {
        pages: HashMap<String, Vec<TransactionsPage>>,
        balances: HashMap<String, f64>,
        failing_uids: Vec<String>,
    }

    #[async_trait]
    impl BankingProvider for ScriptedProvider {
        async fn list_institutions(&self, _country: &str) -> Result<Vec<Institution>> {
            Err(Error::NotConfigured)
        }

        async fn start_authorization(
            &self,
            _institution: &str,
            _country: &str,
            _redirect_url: &str,
        ) -> Result<String> {
            Err(Error::NotConfigured)
        }

        async fn create_session(&self, _authorization_code: &str) -> Result<Session> {
            Err(Error::NotConfigured)
        }

        async fn get_account_details(&self, _account_uid: &str) -> Result<AccountDetails> {
            Err(Error::NotConfigured)
        }

        async fn get_account_balances(&self, account_uid: &str) -> Result<Vec<ProviderBalance>> {
            match self.balances.get(account_uid) {
                Some(amount) => Ok(vec![ProviderBalance {
                    name: None,
                    balance_amount: ProviderAmount {
                        currency: "EUR".to_string(),
                        amount: amount.to_string(),
                    },
                    balance_type: None,
                }]),
                None => Ok(vec![]),
            }
        }

        async fn get_account_transactions(
            &self,
            account_uid: &str,
            continuation_key: Option<&str>,
        ) -> Result<TransactionsPage> {
            if self.failing_uids.iter().any(|u| u == account_uid) {
                return Err(Error::HttpStatus {
                    status: 500,
                    body: "upstream down".to_string(),
                });
            }
            let pages = self
                .pages
                .get(account_uid)
                .ok_or_else(|| Error::InvalidData("unknown uid".into()))?;
            let index = match continuation_key {
                Some(key) => key.parse::<usize>().unwrap(),
                None => 0,
            };
            Ok(pages[index].clone())
        }
    }

    fn provider_tx(ext_id: &str, amount: &str) -> ProviderTransaction {
        ProviderTransaction {
            transaction_id: Some(ext_id.to_string()),
            entry_reference: None,
            transaction_amount: ProviderAmount {
                currency: "EUR".to_string(),
                amount: amount.to_string(),
            },
            credit_debit_indicator: Some("DBIT".to_string()),
            status: Some("BOOK".to_string()),
            booking_date: Some("2026-03-02".to_string()),
            value_date: None,
            remittance_information: Some(vec![format!("purchase {}", ext_id)]),
            creditor: None,
            debtor: None,
        }
    }

    fn connected_account(db: &Database, name: &str, uid: &str) -> i64 {
        db.add_connected_account(name, "Testbank", "session-1", uid)
            .unwrap()
    }

    #[tokio::test]
    async fn test_sync_imports_pages_and_updates_balance() {
        let db = Database::in_memory().unwrap();
        let account_id = connected_account(&db, "Checking", "uid-1");

        let mut provider = ScriptedProvider::default();
        provider.balances.insert("uid-1".to_string(), 1234.56);
        provider.pages.insert(
            "uid-1".to_string(),
            vec![
                TransactionsPage {
                    transactions: vec![provider_tx("a", "10.00"), provider_tx("b", "20.00")],
                    continuation_key: Some("1".to_string()),
                },
                TransactionsPage {
                    transactions: vec![provider_tx("c", "30.00")],
                    continuation_key: None,
                },
            ],
        );

        let service = SyncService::new();
        let report = service.sync_all(&db, &provider).await.unwrap();

        assert_eq!(report.accounts_synced, 1);
        assert_eq!(report.accounts_failed, 0);
        assert_eq!(report.stats.imported, 3);

        let account = db.get_account(account_id).unwrap();
        assert_eq!(account.balance, 1234.56);
        assert!(account.last_synced_at.is_some());
        assert!(account.last_sync_error.is_none());
    }

    #[tokio::test]
    async fn test_sync_is_idempotent_across_passes() {
        let db = Database::in_memory().unwrap();
        connected_account(&db, "Checking", "uid-1");

        let mut provider = ScriptedProvider::default();
        provider.pages.insert(
            "uid-1".to_string(),
            vec![TransactionsPage {
                transactions: vec![provider_tx("a", "10.00")],
                continuation_key: None,
            }],
        );

        let service = SyncService::new();
        let first = service.sync_all(&db, &provider).await.unwrap();
        assert_eq!(first.stats.imported, 1);

        let second = service.sync_all(&db, &provider).await.unwrap();
        assert_eq!(second.stats.imported, 0);
        assert_eq!(second.stats.duplicates, 1);
        assert_eq!(db.list_transactions(None, 100, 0).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_one_failing_account_does_not_stop_the_pass() {
        let db = Database::in_memory().unwrap();
        let bad = connected_account(&db, "Broken", "uid-bad");
        let good = connected_account(&db, "Checking", "uid-good");

        let mut provider = ScriptedProvider::default();
        provider.failing_uids.push("uid-bad".to_string());
        provider.pages.insert(
            "uid-good".to_string(),
            vec![TransactionsPage {
                transactions: vec![provider_tx("a", "10.00")],
                continuation_key: None,
            }],
        );

        let service = SyncService::new();
        let report = service.sync_all(&db, &provider).await.unwrap();

        assert_eq!(report.accounts_synced, 1);
        assert_eq!(report.accounts_failed, 1);
        assert_eq!(report.stats.imported, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, "Broken");

        // Error recorded on the failed account, cleared state on the good one
        let bad_account = db.get_account(bad).unwrap();
        assert!(bad_account.last_sync_error.is_some());
        let good_account = db.get_account(good).unwrap();
        assert!(good_account.last_sync_error.is_none());

        // Latest error observable through the status handle
        assert!(service.status().last_error().is_some());
        assert!(!service.status().is_syncing());
    }

    #[tokio::test]
    async fn test_manual_accounts_are_not_synced() {
        let db = Database::in_memory().unwrap();
        db.add_account("Cash", "Wallet", None).unwrap();

        let service = SyncService::new();
        let report = service.sync_all(&db, &ScriptedProvider::default()).await.unwrap();
        assert_eq!(report.accounts_synced, 0);
        assert_eq!(report.accounts_failed, 0);
    }
}

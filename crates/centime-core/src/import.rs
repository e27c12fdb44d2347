//! Transaction importer
//!
//! Turns validated provider transactions into deduplicated domain records.
//! Import is idempotent on the external identifier, and categorization plus
//! recurring matching run synchronously on every newly inserted record --
//! they are steps of import, not deferred batch jobs.

use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::banking::ProviderTransaction;
use crate::db::Database;
use crate::error::Result;
use crate::models::NewTransaction;
use crate::{categorize, recurring};

/// Label used when the provider supplies no usable text at all
const FALLBACK_LABEL: &str = "Bank transaction";

/// What happened to one provider transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Inserted as a new domain transaction
    Imported(i64),
    /// A transaction with the same external id already exists
    Duplicate,
    /// Pending or unusable record, dropped without error
    Skipped,
}

/// Counters for a batch of imports
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportStats {
    pub imported: i64,
    pub duplicates: i64,
    pub skipped: i64,
}

impl ImportStats {
    pub fn record(&mut self, outcome: &ImportOutcome) {
        match outcome {
            ImportOutcome::Imported(_) => self.imported += 1,
            ImportOutcome::Duplicate => self.duplicates += 1,
            ImportOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Import one provider transaction into an account
///
/// Pending entries and records with unparseable amounts are skipped
/// silently per the propagation policy: malformed upstream data never
/// aborts a batch.
pub fn import_transaction(
    db: &Database,
    account_id: i64,
    tx: &ProviderTransaction,
) -> Result<ImportOutcome> {
    if !tx.is_booked() {
        return Ok(ImportOutcome::Skipped);
    }

    let amount = match tx.normalized_amount() {
        Some(a) => a,
        None => {
            debug!(
                "Skipping transaction with unparseable amount: {:?}",
                tx.transaction_amount.amount
            );
            return Ok(ImportOutcome::Skipped);
        }
    };

    let external_id = external_id_for(tx, amount);
    let label = label_for(tx);
    let merchant = merchant_for(tx, amount);
    let date = date_for(tx);

    let new_tx = NewTransaction {
        account_id: Some(account_id),
        date,
        label,
        merchant,
        amount,
        category_id: None,
        manual: false,
        external_id: Some(external_id),
    };

    let id = match db.insert_transaction(&new_tx)? {
        Some(id) => id,
        None => return Ok(ImportOutcome::Duplicate),
    };

    // Synchronous post-insert steps: assign a category from the rules,
    // then try to tie the record to a recurring definition
    categorize::categorize_transaction(db, id)?;
    let tx = db.get_transaction(id)?;
    recurring::match_recurring(db, &tx)?;

    Ok(ImportOutcome::Imported(id))
}

/// Dedup key: provider transaction id, else entry reference, else a hash
/// of the record's stable fields
///
/// The hash fallback keeps re-fetches of the same page idempotent even for
/// institutions that send no reference at all.
fn external_id_for(tx: &ProviderTransaction, amount: f64) -> String {
    if let Some(ref id) = tx.transaction_id {
        if !id.is_empty() {
            return id.clone();
        }
    }
    if let Some(ref entry_ref) = tx.entry_reference {
        if !entry_ref.is_empty() {
            return entry_ref.clone();
        }
    }

    let mut hasher = Sha256::new();
    hasher.update(tx.booking_date.as_deref().unwrap_or("").as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(label_for(tx).as_bytes());
    hex::encode(hasher.finalize())
}

/// Label: first non-empty remittance line, else a counterparty name,
/// else a generic placeholder
fn label_for(tx: &ProviderTransaction) -> String {
    if let Some(ref lines) = tx.remittance_information {
        if let Some(line) = lines.iter().map(|l| l.trim()).find(|l| !l.is_empty()) {
            return line.to_string();
        }
    }
    if let Some(name) = counterparty_name(tx) {
        return name;
    }
    FALLBACK_LABEL.to_string()
}

/// Merchant: the counterparty on the other side of the money movement
/// (creditor for expenses, debtor for income)
fn merchant_for(tx: &ProviderTransaction, amount: f64) -> Option<String> {
    let (first, second) = if amount < 0.0 {
        (&tx.creditor, &tx.debtor)
    } else {
        (&tx.debtor, &tx.creditor)
    };
    first
        .as_ref()
        .and_then(|p| p.name.clone())
        .or_else(|| second.as_ref().and_then(|p| p.name.clone()))
        .filter(|n| !n.trim().is_empty())
}

fn counterparty_name(tx: &ProviderTransaction) -> Option<String> {
    tx.creditor
        .as_ref()
        .and_then(|p| p.name.clone())
        .or_else(|| tx.debtor.as_ref().and_then(|p| p.name.clone()))
        .filter(|n| !n.trim().is_empty())
}

/// Date: booking date, else value date, else the import time
fn date_for(tx: &ProviderTransaction) -> NaiveDate {
    tx.booking_date
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .or_else(|| {
            tx.value_date
                .as_deref()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        })
        .unwrap_or_else(|| Utc::now().date_naive())
}

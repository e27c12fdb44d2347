//! Centime Core Library
//!
//! Shared functionality for the Centime personal finance tool:
//! - Encrypted SQLite store for accounts, transactions, categories,
//!   recurring definitions and categorization rules
//! - Enable Banking client with per-request RS256 signing
//! - Idempotent transaction importer
//! - Rule-based auto-categorization
//! - Recurring transaction generation, matching and missing detection
//! - Sequential bank synchronization with per-account error isolation
//! - CSV export

pub mod banking;
pub mod categorize;
pub mod credentials;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod recurring;
pub mod sync;

pub use banking::{BankingProvider, EnableBankingClient};
pub use credentials::CredentialStore;
pub use db::Database;
pub use error::{Error, Result};
pub use import::{ImportOutcome, ImportStats};
pub use models::{
    AccountKind, BankAccount, Category, CategoryRule, NewTransaction, RecurringTransaction,
    RuleField, Transaction,
};
pub use recurring::MissingRecurring;
pub use sync::{SyncReport, SyncService, SyncStatus};

//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Centime - Local-first personal finance manager
#[derive(Parser)]
#[command(name = "centime")]
#[command(about = "Local-first personal finance manager with bank sync", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "centime.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set CENTIME_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database and sync status
    Status,

    /// Manage accounts (list, add, remove)
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Manage categories (list, add, remove)
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Manage transactions (list, add, set-category)
    Tx {
        #[command(subcommand)]
        action: Option<TxAction>,
    },

    /// Manage recurring transactions
    Recurring {
        #[command(subcommand)]
        action: Option<RecurringAction>,
    },

    /// Manage auto-categorization rules
    Rules {
        #[command(subcommand)]
        action: Option<RulesAction>,
    },

    /// Connect to a bank through Enable Banking
    Bank {
        #[command(subcommand)]
        action: BankAction,
    },

    /// Synchronize all connected accounts
    Sync,

    /// Export transactions to CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Restrict the export to one account
        #[arg(short, long)]
        account: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// List accounts
    List,

    /// Add a manual account
    Add {
        /// Account name
        name: String,

        /// Institution display name
        #[arg(short, long, default_value = "Manual")]
        institution: String,

        /// Account kind: checking, savings, credit
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Remove an account (its transactions go with it)
    Remove {
        /// Account ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,
    },

    /// Remove a category (transactions become uncategorized)
    Remove {
        /// Category ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TxAction {
    /// List transactions, newest first
    List {
        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Restrict to one account
        #[arg(short, long)]
        account: Option<i64>,
    },

    /// Add a manual transaction
    Add {
        /// Transaction label
        label: String,

        /// Signed amount (negative = expense)
        #[arg(allow_hyphen_values = true)]
        amount: f64,

        /// Date (YYYY-MM-DD), today when omitted
        #[arg(short, long)]
        date: Option<String>,

        /// Account ID
        #[arg(short, long)]
        account: Option<i64>,

        /// Category name
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Assign a category to a transaction
    SetCategory {
        /// Transaction ID
        id: i64,

        /// Category name
        category: String,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List recurring definitions
    List {
        /// Include inactive definitions
        #[arg(long)]
        all: bool,
    },

    /// Add a recurring definition
    Add {
        /// Label (e.g. "Rent")
        label: String,

        /// Signed expected amount
        #[arg(allow_hyphen_values = true)]
        amount: f64,

        /// Expected day of month (1-31)
        day: u32,

        /// Category name
        #[arg(short, long)]
        category: Option<String>,

        /// Account ID
        #[arg(short, long)]
        account: Option<i64>,
    },

    /// Deactivate a definition
    Disable {
        /// Recurring definition ID
        id: i64,
    },

    /// Reactivate a definition
    Enable {
        /// Recurring definition ID
        id: i64,
    },

    /// Remove a definition
    Remove {
        /// Recurring definition ID
        id: i64,
    },

    /// Generate placeholder transactions for a month
    Generate {
        /// Month as YYYY-MM (current month when omitted)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Report definitions missing from a month
    CheckMissing {
        /// Month as YYYY-MM (current month when omitted)
        #[arg(short, long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// List rules in evaluation order
    List,

    /// Add a rule
    Add {
        /// Substring pattern (stored lowercase)
        pattern: String,

        /// Category name
        category: String,

        /// Field to match: merchant or label
        #[arg(short, long, default_value = "label")]
        field: String,
    },

    /// Derive a rule from an existing transaction
    FromTx {
        /// Transaction ID
        id: i64,

        /// Category name
        category: String,
    },

    /// Remove a rule
    Remove {
        /// Rule ID
        id: i64,
    },

    /// Apply the rules to every uncategorized transaction
    Apply,
}

#[derive(Subcommand)]
pub enum BankAction {
    /// Save the Enable Banking application credentials
    Setup {
        /// Application ID from the Enable Banking control panel
        #[arg(long)]
        app_id: String,

        /// Path to the RSA private key PEM file
        #[arg(long)]
        key_file: PathBuf,
    },

    /// Forget the stored credentials
    Reset,

    /// List institutions available in a country
    Institutions {
        /// ISO 3166 two-letter country code
        #[arg(short, long)]
        country: String,
    },

    /// Start the authorization flow for an institution
    Connect {
        /// Institution name as listed by `bank institutions`
        #[arg(short, long)]
        institution: String,

        /// ISO 3166 two-letter country code
        #[arg(short, long)]
        country: String,

        /// Redirect URL registered with the application
        #[arg(long, default_value = "https://localhost/redirect")]
        redirect_url: String,
    },

    /// Finish the flow: exchange the authorization code for a session
    Session {
        /// Authorization code, or the full redirect URL it came back in
        code: String,

        /// Institution display name for the created accounts
        #[arg(short, long, default_value = "Bank")]
        institution: String,
    },
}

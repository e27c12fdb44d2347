//! Domain models for Centime

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A bank account, either manually maintained or connected to a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: i64,
    pub name: String,
    /// Institution display name (e.g., "Nordea")
    pub institution: String,
    pub kind: Option<AccountKind>,
    /// Current balance, refreshed on sync for connected accounts
    pub balance: f64,
    /// Enable Banking session this account belongs to
    pub provider_session_id: Option<String>,
    /// Enable Banking account UID within the session
    pub provider_account_uid: Option<String>,
    /// True for accounts maintained by hand (never synced)
    pub manual: bool,
    /// When the last sync pass touched this account
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Most recent sync error, if the last pass failed for this account
    pub last_sync_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BankAccount {
    /// Whether this account can participate in a sync pass
    pub fn is_connected(&self) -> bool {
        !self.manual && self.provider_account_uid.is_some()
    }
}

/// Account types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown account kind: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: Option<i64>,
    pub date: NaiveDate,
    pub label: String,
    /// Merchant/counterparty name when the provider supplies one
    pub merchant: Option<String>,
    /// Negative = expense, positive = income
    pub amount: f64,
    pub category_id: Option<i64>,
    /// True when entered by hand rather than imported or synthesized
    pub manual: bool,
    /// Provider transaction reference, the deduplication key for imports
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A new transaction before DB insertion
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Option<i64>,
    pub date: NaiveDate,
    pub label: String,
    pub merchant: Option<String>,
    pub amount: f64,
    pub category_id: Option<i64>,
    pub manual: bool,
    pub external_id: Option<String>,
}

/// A user-declared expectation of a monthly transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: i64,
    pub label: String,
    /// Expected signed amount (same sign convention as transactions)
    pub amount: f64,
    /// Expected day of month, 1-31; clamped to the real last day of
    /// short months when generating placeholders
    pub day_of_month: u32,
    pub active: bool,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Which transaction field an auto-categorization rule matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
    MerchantName,
    Label,
}

impl RuleField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MerchantName => "merchant_name",
            Self::Label => "label",
        }
    }
}

impl std::str::FromStr for RuleField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merchant_name" | "merchant" => Ok(Self::MerchantName),
            "label" => Ok(Self::Label),
            _ => Err(format!("Unknown rule field: {}", s)),
        }
    }
}

impl std::fmt::Display for RuleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An auto-categorization rule: lowercase substring pattern mapped to a
/// category, evaluated in insertion order (first match wins)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: i64,
    /// Lowercase match pattern, compared case-insensitively as a substring
    pub pattern: String,
    pub field: RuleField,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
}

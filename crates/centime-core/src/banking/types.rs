//! Enable Banking wire types
//!
//! Typed request/response bodies for the endpoints the client calls.
//! Field names follow the provider's JSON; everything the rest of the
//! app does not consume is simply not declared.

use serde::{Deserialize, Serialize};

/// Booked transaction status code
pub const STATUS_BOOKED: &str = "BOOK";
/// Pending transaction status code; pending entries are never imported
pub const STATUS_PENDING: &str = "PDNG";

const INDICATOR_CREDIT: &str = "CRDT";
const INDICATOR_DEBIT: &str = "DBIT";

/// A bank/ASPSP available in a given country
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InstitutionsResponse {
    pub aspsps: Vec<Institution>,
}

/// Body for `POST /auth`
#[derive(Debug, Serialize)]
pub(crate) struct StartAuthorizationRequest {
    pub access: AccessRequest,
    pub aspsp: AspspRef,
    pub state: String,
    pub redirect_url: String,
    pub psu_type: String,
}

/// Requested access scope: balances and transactions, valid for 90 days
#[derive(Debug, Serialize)]
pub(crate) struct AccessRequest {
    pub valid_until: String,
    pub balances: bool,
    pub transactions: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AspspRef {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartAuthorizationResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest {
    pub code: String,
}

/// An authorized session over one or more provider accounts
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub accounts: Vec<SessionAccount>,
}

/// One account reference inside a session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionAccount {
    pub uid: String,
    #[serde(default)]
    pub account_id: Option<AccountIdentification>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SessionAccount {
    /// Best human-readable name for the account
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.account_id.as_ref().and_then(|a| a.iban.clone()))
            .unwrap_or_else(|| self.uid.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountIdentification {
    #[serde(default)]
    pub iban: Option<String>,
}

/// Response of `GET /accounts/{uid}/details`
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub account_id: Option<AccountIdentification>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalancesResponse {
    pub balances: Vec<ProviderBalance>,
}

/// One balance entry for an account
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderBalance {
    #[serde(default)]
    pub name: Option<String>,
    pub balance_amount: ProviderAmount,
    #[serde(default)]
    pub balance_type: Option<String>,
}

impl ProviderBalance {
    pub fn amount(&self) -> Option<f64> {
        self.balance_amount.amount.trim().parse().ok()
    }
}

/// Amount as the provider reports it: a decimal string plus currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAmount {
    pub currency: String,
    pub amount: String,
}

/// One page of transactions for an account
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsPage {
    pub transactions: Vec<ProviderTransaction>,
    #[serde(default)]
    pub continuation_key: Option<String>,
}

/// A counterparty (creditor or debtor)
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderParty {
    #[serde(default)]
    pub name: Option<String>,
}

/// A transaction as reported by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderTransaction {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub entry_reference: Option<String>,
    pub transaction_amount: ProviderAmount,
    /// "CRDT" or "DBIT"
    #[serde(default)]
    pub credit_debit_indicator: Option<String>,
    /// "BOOK" or "PDNG"
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub value_date: Option<String>,
    #[serde(default)]
    pub remittance_information: Option<Vec<String>>,
    #[serde(default)]
    pub creditor: Option<ProviderParty>,
    #[serde(default)]
    pub debtor: Option<ProviderParty>,
}

impl ProviderTransaction {
    /// Whether the bank has finalized this entry; only booked transactions
    /// are considered for import
    pub fn is_booked(&self) -> bool {
        self.status.as_deref() != Some(STATUS_PENDING)
    }

    /// Signed amount under the canonical convention (positive = credit,
    /// negative = debit), or `None` when the raw amount does not parse
    ///
    /// Some institutions report debits as positive magnitudes alongside the
    /// indicator, others pre-sign the amount; the indicator wins when the
    /// two disagree.
    pub fn normalized_amount(&self) -> Option<f64> {
        let raw: f64 = self.transaction_amount.amount.trim().parse().ok()?;
        let amount = match self.credit_debit_indicator.as_deref() {
            Some(INDICATOR_DEBIT) if raw > 0.0 => -raw,
            Some(INDICATOR_CREDIT) if raw < 0.0 => -raw,
            _ => raw,
        };
        Some(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: &str, indicator: Option<&str>) -> ProviderTransaction {
        ProviderTransaction {
            transaction_id: None,
            entry_reference: None,
            transaction_amount: ProviderAmount {
                currency: "EUR".to_string(),
                amount: amount.to_string(),
            },
            credit_debit_indicator: indicator.map(String::from),
            status: Some(STATUS_BOOKED.to_string()),
            booking_date: None,
            value_date: None,
            remittance_information: None,
            creditor: None,
            debtor: None,
        }
    }

    #[test]
    fn test_debit_with_positive_raw_amount_is_negated() {
        assert_eq!(tx("50.00", Some("DBIT")).normalized_amount(), Some(-50.00));
    }

    #[test]
    fn test_credit_with_negative_raw_amount_is_negated() {
        assert_eq!(tx("-50.00", Some("CRDT")).normalized_amount(), Some(50.00));
    }

    #[test]
    fn test_consistent_signs_pass_through() {
        assert_eq!(tx("-30.00", Some("DBIT")).normalized_amount(), Some(-30.00));
        assert_eq!(tx("12.50", Some("CRDT")).normalized_amount(), Some(12.50));
        // No indicator at all: trust the sign
        assert_eq!(tx("-7.99", None).normalized_amount(), Some(-7.99));
    }

    #[test]
    fn test_unparseable_amount_is_none() {
        assert_eq!(tx("EUR 50", Some("DBIT")).normalized_amount(), None);
    }

    #[test]
    fn test_pending_status() {
        let mut t = tx("10.00", None);
        t.status = Some(STATUS_PENDING.to_string());
        assert!(!t.is_booked());
        t.status = Some(STATUS_BOOKED.to_string());
        assert!(t.is_booked());
    }

    #[test]
    fn test_decode_transactions_page() {
        let json = r#"{
            "transactions": [
                {
                    "entry_reference": "ref-1",
                    "transaction_amount": {"currency": "EUR", "amount": "42.00"},
                    "credit_debit_indicator": "DBIT",
                    "status": "BOOK",
                    "booking_date": "2026-03-02",
                    "remittance_information": ["COFFEE ROASTERY HELSINKI"],
                    "creditor": {"name": "Coffee Roastery"}
                }
            ],
            "continuation_key": "page-2"
        }"#;

        let page: TransactionsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.transactions.len(), 1);
        assert_eq!(page.continuation_key.as_deref(), Some("page-2"));
        assert_eq!(page.transactions[0].normalized_amount(), Some(-42.00));
    }
}

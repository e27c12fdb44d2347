//! Rule-based auto-categorization
//!
//! Rules are plain lowercase substring patterns over a transaction field
//! (merchant name or label). Precedence is insertion order: the first rule
//! that matches wins, even if a later rule is more specific. A rule never
//! overrides a category that is already set.

use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{CategoryRule, RuleField, Transaction};

/// Assign a category to one transaction from the rule list
///
/// Returns the category id that was applied, or `None` when the transaction
/// was already categorized or no rule matched.
pub fn categorize_transaction(db: &Database, transaction_id: i64) -> Result<Option<i64>> {
    let tx = db.get_transaction(transaction_id)?;
    if tx.category_id.is_some() {
        return Ok(None);
    }

    let rules = db.list_rules()?;
    match first_matching_rule(&rules, &tx) {
        Some(rule) => {
            db.set_transaction_category(transaction_id, Some(rule.category_id))?;
            debug!(
                "Categorized transaction {} via rule {} ({})",
                transaction_id, rule.id, rule.pattern
            );
            Ok(Some(rule.category_id))
        }
        None => Ok(None),
    }
}

/// Run the rules over every uncategorized transaction
///
/// Returns the number of transactions that received a category. Transactions
/// with an existing category are never touched.
pub fn apply_rules(db: &Database) -> Result<i64> {
    let rules = db.list_rules()?;
    if rules.is_empty() {
        return Ok(0);
    }

    let mut applied = 0;
    for tx in db.uncategorized_transactions()? {
        if let Some(rule) = first_matching_rule(&rules, &tx) {
            db.set_transaction_category(tx.id, Some(rule.category_id))?;
            applied += 1;
        }
    }

    if applied > 0 {
        info!("Applied rules to {} transactions", applied);
    }
    Ok(applied)
}

/// Derive a rule from an existing transaction
///
/// The pattern comes from the merchant name when present, else the label,
/// lowercased as-is. An identical (pattern, field, category) rule is not
/// duplicated; `None` signals that case.
pub fn create_rule_from_transaction(
    db: &Database,
    transaction_id: i64,
    category_id: i64,
) -> Result<Option<i64>> {
    let tx = db.get_transaction(transaction_id)?;

    let (pattern, field) = match tx.merchant.as_deref().map(str::trim) {
        Some(merchant) if !merchant.is_empty() => (merchant.to_string(), RuleField::MerchantName),
        _ => (tx.label.clone(), RuleField::Label),
    };
    if pattern.trim().is_empty() {
        return Err(Error::InvalidData(
            "Transaction has no text to build a rule from".into(),
        ));
    }

    db.add_rule(&pattern, field, category_id)
}

fn first_matching_rule<'a>(rules: &'a [CategoryRule], tx: &Transaction) -> Option<&'a CategoryRule> {
    rules.iter().find(|rule| rule_matches(rule, tx))
}

/// Case-insensitive substring match of the rule pattern against its field
fn rule_matches(rule: &CategoryRule, tx: &Transaction) -> bool {
    let value = match rule.field {
        RuleField::MerchantName => match tx.merchant.as_deref() {
            Some(m) => m,
            None => return false,
        },
        RuleField::Label => tx.label.as_str(),
    };
    value.to_lowercase().contains(&rule.pattern)
}

//! Recurring transaction engine
//!
//! Three jobs around recurring definitions: synthesize expected transactions
//! for a month, tie freshly imported transactions back to a definition, and
//! report definitions whose expected transaction never showed up.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{NewTransaction, RecurringTransaction, Transaction};

/// Days past the expected date before a recurrence counts as missing,
/// and the half-width of the date window used for matching
const GRACE_DAYS: i64 = 3;

/// Amounts closer than this are considered equal
const AMOUNT_EPSILON: f64 = 0.005;

/// An active definition whose expected transaction has not appeared
#[derive(Debug, Clone)]
pub struct MissingRecurring {
    pub definition: RecurringTransaction,
    pub due_date: NaiveDate,
}

/// Synthesize placeholder transactions for a month
///
/// One per active definition that has no same-label, same-amount transaction
/// in the month already, dated on the definition's day (clamped to the end
/// of short months). Placeholders inherit category and account. Running the
/// generation twice for the same month adds nothing the second time.
pub fn generate_for_month(db: &Database, year: i32, month: u32) -> Result<i64> {
    let existing = db.transactions_in_month(year, month)?;
    let mut generated = 0;

    for def in db.list_recurring(true)? {
        let already_there = existing
            .iter()
            .any(|tx| tx.label == def.label && amounts_equal(tx.amount, def.amount));
        if already_there {
            continue;
        }

        let date = clamped_date(year, month, def.day_of_month)?;
        db.insert_transaction(&NewTransaction {
            account_id: def.account_id,
            date,
            label: def.label.clone(),
            merchant: None,
            amount: def.amount,
            category_id: def.category_id,
            manual: false,
            external_id: None,
        })?;
        generated += 1;
    }

    if generated > 0 {
        info!(
            "Generated {} recurring transactions for {}-{:02}",
            generated, year, month
        );
    }
    Ok(generated)
}

/// Tie a transaction to the first recurring definition it fits
///
/// A definition fits when the amounts are equal and either the date falls
/// within the grace window around the expected day or the transaction label
/// contains the definition label (case-insensitive). When a definition fits
/// and the transaction is uncategorized, it inherits the definition's
/// category. Returns the matched definition's id.
pub fn match_recurring(db: &Database, tx: &Transaction) -> Result<Option<i64>> {
    for def in db.list_recurring(true)? {
        if !amounts_equal(tx.amount, def.amount) {
            continue;
        }

        let expected = clamped_date(tx.date.year(), tx.date.month(), def.day_of_month)?;
        let within_window = (tx.date - expected).num_days().abs() <= GRACE_DAYS;
        let label_match = tx.label.to_lowercase().contains(&def.label.to_lowercase());

        if within_window || label_match {
            if tx.category_id.is_none() {
                if let Some(category_id) = def.category_id {
                    db.set_transaction_category(tx.id, Some(category_id))?;
                    debug!(
                        "Transaction {} inherited category from recurring {}",
                        tx.id, def.id
                    );
                }
            }
            return Ok(Some(def.id));
        }
    }
    Ok(None)
}

/// Report definitions that appear to have been missed in a month
///
/// A definition is missed once `today` is past the expected date plus the
/// grace period and the month holds no transaction matching it either by
/// label or by amount near the expected day. Read-only.
pub fn check_missing(
    db: &Database,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<Vec<MissingRecurring>> {
    let transactions = db.transactions_in_month(year, month)?;
    let mut missing = Vec::new();

    for def in db.list_recurring(true)? {
        let due_date = clamped_date(year, month, def.day_of_month)?;
        if today < due_date + Duration::days(GRACE_DAYS) {
            // Still within the grace period
            continue;
        }

        let satisfied = transactions.iter().any(|tx| {
            let label_match = tx.label.to_lowercase().contains(&def.label.to_lowercase());
            let amount_near_date = amounts_equal(tx.amount, def.amount)
                && (tx.date - due_date).num_days().abs() <= GRACE_DAYS;
            label_match || amount_near_date
        });

        if !satisfied {
            missing.push(MissingRecurring {
                definition: def,
                due_date,
            });
        }
    }

    Ok(missing)
}

fn amounts_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < AMOUNT_EPSILON
}

/// The definition's day in the given month, clamped to the month's length
fn clamped_date(year: i32, month: u32, day_of_month: u32) -> Result<NaiveDate> {
    let day = day_of_month.min(last_day_of_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::InvalidData(format!("Invalid date {}-{}-{}", year, month, day)))
}

fn last_day_of_month(year: i32, month: u32) -> Result<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidData(format!("Invalid month {}-{}", year, month)))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| Error::InvalidData(format!("Invalid month {}-{}", year, month)))?;
    Ok((next_month - first).num_days() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn insert_tx(db: &Database, label: &str, amount: f64, on: NaiveDate) -> i64 {
        db.insert_transaction(&NewTransaction {
            account_id: None,
            date: on,
            label: label.to_string(),
            merchant: None,
            amount,
            category_id: None,
            manual: true,
            external_id: None,
        })
        .unwrap()
        .unwrap()
    }

    #[test]
    fn test_generate_for_month_is_idempotent() {
        let db = Database::in_memory().unwrap();
        db.add_recurring("Rent", -800.0, 1, None, None).unwrap();
        db.add_recurring("Netflix", -13.49, 15, None, None).unwrap();

        assert_eq!(generate_for_month(&db, 2026, 3).unwrap(), 2);
        assert_eq!(generate_for_month(&db, 2026, 3).unwrap(), 0);
        assert_eq!(db.transactions_in_month(2026, 3).unwrap().len(), 2);
    }

    #[test]
    fn test_generate_skips_definitions_already_satisfied() {
        let db = Database::in_memory().unwrap();
        db.add_recurring("Rent", -800.0, 1, None, None).unwrap();
        insert_tx(&db, "Rent", -800.0, date(2026, 3, 2));

        assert_eq!(generate_for_month(&db, 2026, 3).unwrap(), 0);
    }

    #[test]
    fn test_generate_clamps_day_to_short_months() {
        let db = Database::in_memory().unwrap();
        db.add_recurring("Payday", 2500.0, 31, None, None).unwrap();

        generate_for_month(&db, 2026, 2).unwrap();
        let txs = db.transactions_in_month(2026, 2).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].date, date(2026, 2, 28));
        assert!(!txs[0].manual);
    }

    #[test]
    fn test_generate_inherits_category_and_account() {
        let db = Database::in_memory().unwrap();
        let housing = db.add_category("Housing").unwrap();
        let account = db.add_account("Checking", "Testbank", None).unwrap();
        db.add_recurring("Rent", -800.0, 1, Some(housing), Some(account))
            .unwrap();

        generate_for_month(&db, 2026, 3).unwrap();
        let txs = db.transactions_in_month(2026, 3).unwrap();
        assert_eq!(txs[0].category_id, Some(housing));
        assert_eq!(txs[0].account_id, Some(account));
    }

    #[test]
    fn test_match_by_date_window() {
        let db = Database::in_memory().unwrap();
        let housing = db.add_category("Housing").unwrap();
        let def = db
            .add_recurring("Rent", -800.0, 5, Some(housing), None)
            .unwrap();

        // Day 7 is within the window of an expected day 5
        let id = insert_tx(&db, "VIR M DUPONT", -800.0, date(2026, 3, 7));
        let tx = db.get_transaction(id).unwrap();
        assert_eq!(match_recurring(&db, &tx).unwrap(), Some(def));
        assert_eq!(db.get_transaction(id).unwrap().category_id, Some(housing));

        // Day 15 with no label overlap is not a match
        let id = insert_tx(&db, "VIR M DUPONT", -800.0, date(2026, 3, 15));
        let tx = db.get_transaction(id).unwrap();
        assert_eq!(match_recurring(&db, &tx).unwrap(), None);
    }

    #[test]
    fn test_match_by_label_outside_window() {
        let db = Database::in_memory().unwrap();
        let def = db.add_recurring("Netflix", -13.49, 1, None, None).unwrap();

        let id = insert_tx(&db, "NETFLIX.COM AMSTERDAM", -13.49, date(2026, 3, 20));
        let tx = db.get_transaction(id).unwrap();
        assert_eq!(match_recurring(&db, &tx).unwrap(), Some(def));
    }

    #[test]
    fn test_match_requires_equal_amount() {
        let db = Database::in_memory().unwrap();
        db.add_recurring("Netflix", -13.49, 1, None, None).unwrap();

        let id = insert_tx(&db, "NETFLIX.COM AMSTERDAM", -15.99, date(2026, 3, 1));
        let tx = db.get_transaction(id).unwrap();
        assert_eq!(match_recurring(&db, &tx).unwrap(), None);
    }

    #[test]
    fn test_match_does_not_override_existing_category() {
        let db = Database::in_memory().unwrap();
        let housing = db.add_category("Housing").unwrap();
        let other = db.add_category("Other").unwrap();
        db.add_recurring("Rent", -800.0, 5, Some(housing), None)
            .unwrap();

        let id = insert_tx(&db, "Rent payment", -800.0, date(2026, 3, 5));
        db.set_transaction_category(id, Some(other)).unwrap();
        let tx = db.get_transaction(id).unwrap();

        assert!(match_recurring(&db, &tx).unwrap().is_some());
        assert_eq!(db.get_transaction(id).unwrap().category_id, Some(other));
    }

    #[test]
    fn test_missing_grace_boundary() {
        let db = Database::in_memory().unwrap();
        db.add_recurring("Rent", -800.0, 5, None, None).unwrap();

        // Day 7: still inside the grace period
        let missing = check_missing(&db, 2026, 3, date(2026, 3, 7)).unwrap();
        assert!(missing.is_empty());

        // Day 9: grace expired, nothing matched
        let missing = check_missing(&db, 2026, 3, date(2026, 3, 9)).unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].definition.label, "Rent");
        assert_eq!(missing[0].due_date, date(2026, 3, 5));
    }

    #[test]
    fn test_missing_satisfied_by_label_or_amount_near_date() {
        let db = Database::in_memory().unwrap();
        db.add_recurring("Rent", -800.0, 5, None, None).unwrap();
        db.add_recurring("Gym", -35.0, 5, None, None).unwrap();

        // Rent satisfied by label anywhere in the month
        insert_tx(&db, "Monthly rent transfer", -800.0, date(2026, 3, 20));
        // Gym satisfied by amount close to the expected day
        insert_tx(&db, "SEPA DD 99231", -35.0, date(2026, 3, 6));

        let missing = check_missing(&db, 2026, 3, date(2026, 3, 31)).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_inactive_definitions_are_ignored() {
        let db = Database::in_memory().unwrap();
        let def = db.add_recurring("Old gym", -25.0, 5, None, None).unwrap();
        db.set_recurring_active(def, false).unwrap();

        assert_eq!(generate_for_month(&db, 2026, 3).unwrap(), 0);
        assert!(check_missing(&db, 2026, 3, date(2026, 3, 31))
            .unwrap()
            .is_empty());
    }
}

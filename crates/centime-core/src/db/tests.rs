//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn new_tx(account_id: Option<i64>, label: &str, amount: f64, on: NaiveDate) -> NewTransaction {
        NewTransaction {
            account_id,
            date: on,
            label: label.to_string(),
            merchant: None,
            amount,
            category_id: None,
            manual: true,
            external_id: None,
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_accounts().unwrap().is_empty());
        assert!(db.list_categories().unwrap().is_empty());
    }

    #[test]
    fn test_schema_has_expected_tables() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                 ('accounts', 'categories', 'transactions', 'recurring_transactions', 'category_rules')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_account_crud() {
        let db = Database::in_memory().unwrap();

        let id = db
            .add_account("Main checking", "Testbank", Some(AccountKind::Checking))
            .unwrap();
        assert!(id > 0);

        let account = db.get_account(id).unwrap();
        assert_eq!(account.name, "Main checking");
        assert_eq!(account.kind, Some(AccountKind::Checking));
        assert!(account.manual);
        assert!(!account.is_connected());

        db.update_account_balance(id, 321.09).unwrap();
        assert_eq!(db.get_account(id).unwrap().balance, 321.09);

        db.delete_account(id).unwrap();
        assert!(db.get_account(id).is_err());
    }

    #[test]
    fn test_connected_account_linkage() {
        let db = Database::in_memory().unwrap();
        let id = db
            .add_connected_account("Checking", "Nordea", "session-1", "uid-1")
            .unwrap();

        let account = db.get_account(id).unwrap();
        assert!(!account.manual);
        assert!(account.is_connected());
        assert_eq!(account.provider_account_uid.as_deref(), Some("uid-1"));

        // Manual accounts are excluded from the connected listing
        db.add_account("Cash", "Wallet", None).unwrap();
        let connected = db.list_connected_accounts().unwrap();
        assert_eq!(connected.len(), 1);
        assert_eq!(connected[0].id, id);
    }

    #[test]
    fn test_record_account_sync_latest_wins() {
        let db = Database::in_memory().unwrap();
        let id = db
            .add_connected_account("Checking", "Nordea", "session-1", "uid-1")
            .unwrap();

        db.record_account_sync(id, chrono::Utc::now(), Some("boom"))
            .unwrap();
        assert_eq!(
            db.get_account(id).unwrap().last_sync_error.as_deref(),
            Some("boom")
        );

        // A later successful pass clears the error
        db.record_account_sync(id, chrono::Utc::now(), None).unwrap();
        let account = db.get_account(id).unwrap();
        assert!(account.last_sync_error.is_none());
        assert!(account.last_synced_at.is_some());
    }

    #[test]
    fn test_category_add_is_idempotent_on_name() {
        let db = Database::in_memory().unwrap();
        let a = db.add_category("Groceries").unwrap();
        let b = db.add_category("Groceries").unwrap();
        assert_eq!(a, b);
        assert_eq!(db.list_categories().unwrap().len(), 1);

        assert_eq!(db.find_category("Groceries").unwrap().map(|c| c.id), Some(a));
        assert!(db.find_category("Nope").unwrap().is_none());
    }

    #[test]
    fn test_transaction_insert_and_external_id_dedup() {
        let db = Database::in_memory().unwrap();

        let mut tx = new_tx(None, "Coffee", -3.2, date(2026, 3, 2));
        tx.external_id = Some("ext-1".to_string());

        let first = db.insert_transaction(&tx).unwrap();
        assert!(first.is_some());
        let second = db.insert_transaction(&tx).unwrap();
        assert!(second.is_none());

        // No external id: always inserted
        let no_ext = new_tx(None, "Coffee", -3.2, date(2026, 3, 2));
        assert!(db.insert_transaction(&no_ext).unwrap().is_some());
        assert!(db.insert_transaction(&no_ext).unwrap().is_some());

        assert_eq!(db.list_transactions(None, 100, 0).unwrap().len(), 3);
    }

    #[test]
    fn test_list_transactions_ordering_and_paging() {
        let db = Database::in_memory().unwrap();
        db.insert_transaction(&new_tx(None, "old", -1.0, date(2026, 1, 5)))
            .unwrap();
        db.insert_transaction(&new_tx(None, "new", -2.0, date(2026, 3, 5)))
            .unwrap();
        db.insert_transaction(&new_tx(None, "mid", -3.0, date(2026, 2, 5)))
            .unwrap();

        let all = db.list_transactions(None, 100, 0).unwrap();
        let labels: Vec<&str> = all.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["new", "mid", "old"]);

        let page = db.list_transactions(None, 1, 1).unwrap();
        assert_eq!(page[0].label, "mid");
    }

    #[test]
    fn test_transactions_in_month_bounds() {
        let db = Database::in_memory().unwrap();
        db.insert_transaction(&new_tx(None, "in", -1.0, date(2026, 2, 28)))
            .unwrap();
        db.insert_transaction(&new_tx(None, "first", -1.0, date(2026, 2, 1)))
            .unwrap();
        db.insert_transaction(&new_tx(None, "out", -1.0, date(2026, 3, 1)))
            .unwrap();

        let feb = db.transactions_in_month(2026, 2).unwrap();
        assert_eq!(feb.len(), 2);
        assert!(feb.iter().all(|t| t.label != "out"));
    }

    #[test]
    fn test_account_delete_cascades_to_transactions_and_recurring() {
        let db = Database::in_memory().unwrap();
        let account = db.add_account("Checking", "Testbank", None).unwrap();
        db.insert_transaction(&new_tx(Some(account), "Coffee", -3.2, date(2026, 3, 2)))
            .unwrap();
        db.add_recurring("Rent", -800.0, 1, None, Some(account))
            .unwrap();

        db.delete_account(account).unwrap();

        assert!(db.list_transactions(None, 100, 0).unwrap().is_empty());
        assert!(db.list_recurring(false).unwrap().is_empty());
    }

    #[test]
    fn test_category_delete_nullifies_references() {
        let db = Database::in_memory().unwrap();
        let category = db.add_category("Food").unwrap();

        let mut tx = new_tx(None, "Lunch", -12.0, date(2026, 3, 2));
        tx.category_id = Some(category);
        let tx_id = db.insert_transaction(&tx).unwrap().unwrap();
        let rec_id = db
            .add_recurring("Lunch plan", -12.0, 1, Some(category), None)
            .unwrap();
        db.add_rule("lunch", RuleField::Label, category).unwrap();

        db.delete_category(category).unwrap();

        assert_eq!(db.get_transaction(tx_id).unwrap().category_id, None);
        assert_eq!(db.get_recurring(rec_id).unwrap().category_id, None);
        // Rules pointing at the category go away with it
        assert!(db.list_rules().unwrap().is_empty());
    }

    #[test]
    fn test_recurring_crud_and_day_validation() {
        let db = Database::in_memory().unwrap();

        assert!(db.add_recurring("Bad", -1.0, 0, None, None).is_err());
        assert!(db.add_recurring("Bad", -1.0, 32, None, None).is_err());

        let id = db.add_recurring("Rent", -800.0, 5, None, None).unwrap();
        let def = db.get_recurring(id).unwrap();
        assert_eq!(def.day_of_month, 5);
        assert!(def.active);

        db.set_recurring_active(id, false).unwrap();
        assert!(db.list_recurring(true).unwrap().is_empty());
        assert_eq!(db.list_recurring(false).unwrap().len(), 1);

        db.delete_recurring(id).unwrap();
        assert!(db.get_recurring(id).is_err());
    }

    #[test]
    fn test_rules_lowercase_dedup_and_order() {
        let db = Database::in_memory().unwrap();
        let food = db.add_category("Food").unwrap();
        let transport = db.add_category("Transport").unwrap();

        let first = db.add_rule("Carrefour", RuleField::MerchantName, food).unwrap();
        assert!(first.is_some());

        // Case-insensitive duplicate of the same triple
        assert!(db
            .add_rule("CARREFOUR", RuleField::MerchantName, food)
            .unwrap()
            .is_none());

        // Same pattern, different category: a distinct rule
        assert!(db
            .add_rule("carrefour", RuleField::MerchantName, transport)
            .unwrap()
            .is_some());

        let rules = db.list_rules().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern, "carrefour");
        assert_eq!(rules[0].category_id, food);
        assert_eq!(rules[1].category_id, transport);

        db.delete_rule(rules[0].id).unwrap();
        assert_eq!(db.list_rules().unwrap().len(), 1);
    }
}

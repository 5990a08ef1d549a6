//! Shared builders for unit tests.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::{CategorySource, Transaction, TransactionStatus};

/// A posted expense at `acc_1`, categorized as `cat_2`, dated 2025-01-15.
pub fn txn(id: &str, amount: f64) -> Transaction {
    let created = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
    Transaction {
        id: id.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        merchant: format!("Merchant {id}"),
        description: format!("Merchant {id} - Purchase"),
        amount,
        account_id: "acc_1".to_string(),
        category_id: Some("cat_2".to_string()),
        category_source: CategorySource::Automatic,
        status: TransactionStatus::Posted,
        notes: String::new(),
        is_deleted: false,
        is_hidden: false,
        created_at: created,
        updated_at: created,
    }
}

/// `n` transactions `t0..t{n-1}` with distinct days and alternating signs.
pub fn txns(n: usize) -> Vec<Transaction> {
    (0..n)
        .map(|i| {
            let mut t = txn(&format!("t{i}"), if i % 2 == 0 { -25.0 } else { 100.0 });
            t.date = NaiveDate::from_ymd_opt(2025, 1, (i % 28) as u32 + 1).unwrap();
            t
        })
        .collect()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

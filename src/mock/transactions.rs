use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::Catalog;
use crate::models::{CategorySource, Transaction, TransactionStatus};

pub const DEFAULT_TRANSACTION_COUNT: usize = 75;
/// Largest book the generator will build.
pub const MAX_TRANSACTION_COUNT: usize = 10_000;

/// How far back generated transactions reach.
const DAYS_BACK: i64 = 90;

struct MerchantProfile {
    merchant: &'static str,
    category_id: &'static str,
    min: f64,
    max: f64,
    is_income: bool,
}

const fn expense(
    merchant: &'static str,
    category_id: &'static str,
    min: f64,
    max: f64,
) -> MerchantProfile {
    MerchantProfile { merchant, category_id, min, max, is_income: false }
}

const fn income(
    merchant: &'static str,
    category_id: &'static str,
    min: f64,
    max: f64,
) -> MerchantProfile {
    MerchantProfile { merchant, category_id, min, max, is_income: true }
}

const PROFILES: &[MerchantProfile] = &[
    income("Stripe", "cat_1", 1200.0, 6500.0),
    income("Square", "cat_1", 300.0, 2400.0),
    income("Shopify Payments", "cat_1", 500.0, 3200.0),
    income("Acme Corp", "cat_1", 2500.0, 9000.0),
    income("PayPal", "cat_1", 150.0, 1200.0),
    income("Amazon Refund", "cat_13", 15.0, 180.0),
    income("Interest Payment", "cat_13", 2.0, 25.0),
    expense("Adobe", "cat_2", 54.99, 84.99),
    expense("GitHub", "cat_2", 4.0, 21.0),
    expense("Slack", "cat_2", 8.75, 15.0),
    expense("Google Workspace", "cat_2", 12.0, 18.0),
    expense("Notion", "cat_2", 8.0, 16.0),
    expense("Figma", "cat_2", 12.0, 45.0),
    expense("AWS", "cat_2", 80.0, 420.0),
    expense("Uber Eats", "cat_3", 18.0, 65.0),
    expense("Starbucks", "cat_3", 4.5, 24.0),
    expense("Sweetgreen", "cat_3", 12.0, 38.0),
    expense("The Capital Grille", "cat_3", 120.0, 480.0),
    expense("Delta Air Lines", "cat_4", 180.0, 950.0),
    expense("Marriott", "cat_4", 160.0, 720.0),
    expense("Airbnb", "cat_4", 140.0, 880.0),
    expense("Staples", "cat_5", 12.0, 160.0),
    expense("Amazon", "cat_5", 9.0, 240.0),
    expense("Costco", "cat_5", 35.0, 310.0),
    expense("Google Ads", "cat_6", 150.0, 1400.0),
    expense("Meta Ads", "cat_6", 100.0, 1100.0),
    expense("Mailchimp", "cat_6", 20.0, 120.0),
    expense("Vistaprint", "cat_6", 25.0, 180.0),
    expense("WeWork", "cat_7", 450.0, 1800.0),
    expense("Comcast Business", "cat_7", 89.0, 189.0),
    expense("PG&E", "cat_7", 60.0, 340.0),
    expense("Gusto", "cat_8", 2800.0, 9500.0),
    expense("ADP", "cat_8", 1500.0, 6200.0),
    expense("LegalZoom", "cat_9", 79.0, 399.0),
    expense("Bench Accounting", "cat_9", 249.0, 499.0),
    expense("Uber", "cat_10", 9.0, 58.0),
    expense("Shell", "cat_10", 30.0, 85.0),
    expense("Chase Service Fee", "cat_11", 5.0, 35.0),
    expense("The Hartford", "cat_12", 95.0, 410.0),
    expense("Target", "cat_14", 15.0, 120.0),
];

const NOTES: &[&str] = &[
    "Client dinner",
    "Reimbursable",
    "Quarterly renewal",
    "Check receipt",
    "Split with partner",
    "Conference travel",
];

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `count` transactions from random merchant profiles dated within the last
/// 90 days of `today`, newest first, with ids `txn_001`, `txn_002`, ...
pub fn generate_transactions<R: Rng>(
    rng: &mut R,
    catalog: &Catalog,
    today: NaiveDate,
    count: usize,
) -> Vec<Transaction> {
    let account_ids: Vec<&str> = catalog.accounts().iter().map(|a| a.id.as_str()).collect();
    let count = count.min(MAX_TRANSACTION_COUNT);
    let mut txns = Vec::with_capacity(count);

    for _ in 0..count {
        let Some(profile) = PROFILES.choose(rng) else {
            break;
        };

        let magnitude = round_cents(rng.gen_range(profile.min..=profile.max));
        let amount = if profile.is_income { magnitude } else { -magnitude };
        let date = today - Duration::days(rng.gen_range(0..DAYS_BACK));

        let account_id = account_ids.choose(rng).copied().unwrap_or("acc_1").to_string();

        // ~75% automatic, ~15% manual, ~5% rule, ~5% left uncategorized
        let roll: f64 = rng.gen();
        let (category_id, category_source) = if roll < 0.75 {
            (Some(profile.category_id.to_string()), CategorySource::Automatic)
        } else if roll < 0.90 {
            (Some(profile.category_id.to_string()), CategorySource::Manual)
        } else if roll < 0.95 {
            (Some(profile.category_id.to_string()), CategorySource::Rule)
        } else {
            (None, CategorySource::Automatic)
        };

        let status = if rng.gen_bool(0.9) {
            TransactionStatus::Posted
        } else {
            TransactionStatus::Pending
        };

        let notes = if rng.gen_bool(0.1) {
            NOTES.choose(rng).copied().unwrap_or_default().to_string()
        } else {
            String::new()
        };

        let minutes = rng.gen_range(8 * 60..20 * 60);
        let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or_default();
        let created_at = Utc.from_utc_datetime(&date.and_time(time));

        let suffix = if profile.is_income { "Deposit" } else { "Purchase" };
        txns.push(Transaction {
            id: String::new(),
            date,
            merchant: profile.merchant.to_string(),
            description: format!("{} - {suffix}", profile.merchant),
            amount,
            account_id,
            category_id,
            category_source,
            status,
            notes,
            is_deleted: false,
            is_hidden: false,
            created_at,
            updated_at: created_at,
        });
    }

    txns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    for (i, txn) in txns.iter_mut().enumerate() {
        txn.id = format!("txn_{:03}", i + 1);
    }
    txns
}

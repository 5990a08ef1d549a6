use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::catalog::UNCATEGORIZED_ID;
use crate::models::{Transaction, TransactionStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Bounds on expense magnitude. Both are positive numbers applied against the
/// negative-expense convention: `min = 100` keeps amounts at or below `-100`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmountRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Every dimension left empty or unset places no constraint on the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search: String,
    pub date_range: DateRange,
    pub accounts: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub statuses: BTreeSet<TransactionStatus>,
    pub amount_range: AmountRange,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        *self == FilterState::default()
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if txn.is_deleted {
            return false;
        }

        let needle = self.search.to_lowercase();
        if !needle.is_empty()
            && !txn.merchant.to_lowercase().contains(&needle)
            && !txn.description.to_lowercase().contains(&needle)
            && !txn.notes.to_lowercase().contains(&needle)
        {
            return false;
        }

        if let Some(from) = self.date_range.from {
            if txn.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_range.to {
            if txn.date > to {
                return false;
            }
        }

        if !self.accounts.is_empty() && !self.accounts.contains(&txn.account_id) {
            return false;
        }

        if !self.categories.is_empty() {
            let effective = txn.category_id.as_deref().unwrap_or(UNCATEGORIZED_ID);
            if !self.categories.contains(effective) {
                return false;
            }
        }

        if !self.statuses.is_empty() && !self.statuses.contains(&txn.status) {
            return false;
        }

        if let Some(min) = self.amount_range.min {
            if txn.amount > -min {
                return false;
            }
        }
        if let Some(max) = self.amount_range.max {
            if txn.amount < -max {
                return false;
            }
        }

        true
    }

    /// Short human-readable summary for status lines, e.g. `search: uber, status: pending`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.search.is_empty() {
            parts.push(format!("search: {:?}", self.search));
        }
        if let Some(from) = self.date_range.from {
            parts.push(format!("from: {from}"));
        }
        if let Some(to) = self.date_range.to {
            parts.push(format!("to: {to}"));
        }
        if !self.accounts.is_empty() {
            let ids: Vec<&str> = self.accounts.iter().map(String::as_str).collect();
            parts.push(format!("accounts: {}", ids.join("|")));
        }
        if !self.categories.is_empty() {
            let ids: Vec<&str> = self.categories.iter().map(String::as_str).collect();
            parts.push(format!("categories: {}", ids.join("|")));
        }
        if !self.statuses.is_empty() {
            let labels: Vec<&str> = self.statuses.iter().map(|s| s.label()).collect();
            parts.push(format!("status: {}", labels.join("|")));
        }
        if let Some(min) = self.amount_range.min {
            parts.push(format!("min: {min:.2}"));
        }
        if let Some(max) = self.amount_range.max {
            parts.push(format!("max: {max:.2}"));
        }
        parts.join(", ")
    }
}

/// The non-deleted transactions matching every active dimension of `filter`,
/// in their original order.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: &FilterState,
) -> Vec<&'a Transaction> {
    transactions.iter().filter(|t| filter.matches(t)).collect()
}

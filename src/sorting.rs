use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::BipsError;
use crate::models::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Date,
    Merchant,
    Amount,
    Category,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Date,
        SortField::Merchant,
        SortField::Amount,
        SortField::Category,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortField::Date => "Date",
            SortField::Merchant => "Merchant",
            SortField::Amount => "Amount",
            SortField::Category => "Category",
        }
    }
}

impl FromStr for SortField {
    type Err = BipsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "merchant" => Ok(SortField::Merchant),
            "amount" => Ok(SortField::Amount),
            "category" => Ok(SortField::Category),
            other => Err(BipsError::InvalidValue {
                kind: "sort field",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> char {
        match self {
            SortDirection::Ascending => '▲',
            SortDirection::Descending => '▼',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Date,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Clicking the active column flips direction; any other column becomes
    /// active and starts descending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Descending;
        }
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.label(), self.direction.arrow())
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Ascending comparison of two transactions on `field`.
fn compare_by(field: SortField, a: &Transaction, b: &Transaction, catalog: &Catalog) -> Ordering {
    match field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Merchant => compare_text(&a.merchant, &b.merchant),
        SortField::Amount => a.amount.total_cmp(&b.amount),
        SortField::Category => compare_text(
            &catalog.lookup_category(a.category_id.as_deref()).name,
            &catalog.lookup_category(b.category_id.as_deref()).name,
        ),
    }
}

/// Stable sort: rows that compare equal keep their incoming relative order in
/// either direction.
pub fn sort_transactions<'a>(
    mut transactions: Vec<&'a Transaction>,
    sort: SortState,
    catalog: &Catalog,
) -> Vec<&'a Transaction> {
    transactions.sort_by(|a, b| {
        let ord = compare_by(sort.field, a, b, catalog);
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    transactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, txn};

    fn amounts(view: &[&Transaction]) -> Vec<f64> {
        view.iter().map(|t| t.amount).collect()
    }

    fn ids<'a>(view: &[&'a Transaction]) -> Vec<&'a str> {
        view.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_sort_amount_both_directions() {
        let catalog = Catalog::standard();
        let all = vec![txn("a", -50.0), txn("b", 200.0), txn("c", -10.0)];

        let asc = sort_transactions(
            all.iter().collect(),
            SortState::new(SortField::Amount, SortDirection::Ascending),
            &catalog,
        );
        assert_eq!(amounts(&asc), vec![-50.0, -10.0, 200.0]);

        let desc = sort_transactions(
            all.iter().collect(),
            SortState::new(SortField::Amount, SortDirection::Descending),
            &catalog,
        );
        assert_eq!(amounts(&desc), vec![200.0, -10.0, -50.0]);
    }

    #[test]
    fn test_sort_date() {
        let catalog = Catalog::standard();
        let mut a = txn("a", -1.0);
        a.date = date("2025-03-01");
        let mut b = txn("b", -1.0);
        b.date = date("2025-01-01");
        let mut c = txn("c", -1.0);
        c.date = date("2025-02-01");
        let all = vec![a, b, c];

        let desc = sort_transactions(all.iter().collect(), SortState::default(), &catalog);
        assert_eq!(ids(&desc), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_sort_merchant_ignores_case() {
        let catalog = Catalog::standard();
        let mut a = txn("a", -1.0);
        a.merchant = "zoom".to_string();
        let mut b = txn("b", -1.0);
        b.merchant = "Adobe".to_string();
        let mut c = txn("c", -1.0);
        c.merchant = "amazon".to_string();
        let all = vec![a, b, c];

        let asc = sort_transactions(
            all.iter().collect(),
            SortState::new(SortField::Merchant, SortDirection::Ascending),
            &catalog,
        );
        assert_eq!(ids(&asc), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_category_by_resolved_name() {
        let catalog = Catalog::standard();
        let mut a = txn("a", -1.0);
        a.category_id = Some("cat_4".to_string()); // Travel
        let mut b = txn("b", -1.0);
        b.category_id = None; // Uncategorized
        let mut c = txn("c", -1.0);
        c.category_id = Some("cat_11".to_string()); // Bank Fees
        let all = vec![a, b, c];

        let asc = sort_transactions(
            all.iter().collect(),
            SortState::new(SortField::Category, SortDirection::Ascending),
            &catalog,
        );
        assert_eq!(ids(&asc), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let catalog = Catalog::standard();
        let all = vec![txn("a", -5.0), txn("b", -5.0), txn("c", -1.0), txn("d", -5.0)];

        let asc = sort_transactions(
            all.iter().collect(),
            SortState::new(SortField::Amount, SortDirection::Ascending),
            &catalog,
        );
        assert_eq!(ids(&asc), vec!["a", "b", "d", "c"]);

        let desc = sort_transactions(
            all.iter().collect(),
            SortState::new(SortField::Amount, SortDirection::Descending),
            &catalog,
        );
        assert_eq!(ids(&desc), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_toggle_same_field_flips() {
        let mut sort = SortState::new(SortField::Amount, SortDirection::Descending);
        sort.toggle(SortField::Amount);
        assert_eq!(sort.direction, SortDirection::Ascending);
        sort.toggle(SortField::Amount);
        assert_eq!(sort.direction, SortDirection::Descending);
    }

    #[test]
    fn test_toggle_new_field_resets_to_descending() {
        let mut sort = SortState::new(SortField::Date, SortDirection::Ascending);
        sort.toggle(SortField::Merchant);
        assert_eq!(sort, SortState::new(SortField::Merchant, SortDirection::Descending));
    }

    #[test]
    fn test_sort_field_from_str() {
        assert_eq!("Amount".parse::<SortField>().unwrap(), SortField::Amount);
        assert!("payee".parse::<SortField>().is_err());
    }
}

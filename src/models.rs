use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BipsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
    Investment,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::Credit => "credit",
            AccountType::Investment => "investment",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub institution: String,
    pub account_type: AccountType,
    pub last_four: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Hex color, e.g. `#22c55e`.
    pub color: String,
    pub emoji: String,
    pub parent_id: Option<String>,
    /// Hidden categories are left out of pickers but still match filters.
    pub is_hidden: bool,
}

/// How a transaction ended up with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySource {
    Automatic,
    Manual,
    Rule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Posted,
}

impl TransactionStatus {
    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Posted => "posted",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransactionStatus {
    type Err = BipsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "posted" => Ok(TransactionStatus::Posted),
            other => Err(BipsError::InvalidValue {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub merchant: String,
    pub description: String,
    /// Negative for expenses, positive for income.
    pub amount: f64,
    pub account_id: String,
    pub category_id: Option<String>,
    pub category_source: CategorySource,
    pub status: TransactionStatus,
    pub notes: String,
    pub is_deleted: bool,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Quarterly,
    Yearly,
}

impl FromStr for Granularity {
    type Err = BipsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(Granularity::Monthly),
            "quarterly" | "quarter" => Ok(Granularity::Quarterly),
            "yearly" | "year" => Ok(Granularity::Yearly),
            other => Err(BipsError::InvalidValue {
                kind: "granularity",
                value: other.to_string(),
            }),
        }
    }
}

/// Fabricated revenue/cost/cash figures for one month, quarter or year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialPeriod {
    pub label: String,
    pub granularity: Granularity,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub revenue: f64,
    pub costs: f64,
    pub net_income: f64,
    pub cash_on_hand: f64,
}

impl FinancialPeriod {
    pub fn is_loss(&self) -> bool {
        self.net_income < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!("Posted".parse::<TransactionStatus>().unwrap(), TransactionStatus::Posted);
        assert_eq!(" pending ".parse::<TransactionStatus>().unwrap(), TransactionStatus::Pending);
        assert!("cleared".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("quarterly".parse::<Granularity>().unwrap(), Granularity::Quarterly);
        assert_eq!("year".parse::<Granularity>().unwrap(), Granularity::Yearly);
        assert!("weekly".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_category_source_serializes_lowercase() {
        let json = serde_json::to_string(&CategorySource::Rule).unwrap();
        assert_eq!(json, "\"rule\"");
    }
}

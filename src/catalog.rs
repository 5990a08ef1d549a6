use crate::models::{Account, AccountType, Category};

pub const UNCATEGORIZED_ID: &str = "uncategorized";
pub const UNKNOWN_ACCOUNT: &str = "Unknown";

struct AccountSeed {
    id: &'static str,
    name: &'static str,
    institution: &'static str,
    account_type: AccountType,
    last_four: &'static str,
}

const fn account(
    id: &'static str,
    name: &'static str,
    institution: &'static str,
    account_type: AccountType,
    last_four: &'static str,
) -> AccountSeed {
    AccountSeed {
        id,
        name,
        institution,
        account_type,
        last_four,
    }
}

const ACCOUNTS: &[AccountSeed] = &[
    account("acc_1", "Business Checking", "Chase", AccountType::Checking, "4821"),
    account("acc_2", "Business Savings", "Chase", AccountType::Savings, "9034"),
    account("acc_3", "Amex Business Gold", "American Express", AccountType::Credit, "1007"),
    account("acc_4", "Brokerage", "Charles Schwab", AccountType::Investment, "5566"),
];

struct CategorySeed {
    id: &'static str,
    name: &'static str,
    color: &'static str,
    emoji: &'static str,
    is_hidden: bool,
}

const fn category(
    id: &'static str,
    name: &'static str,
    color: &'static str,
    emoji: &'static str,
    is_hidden: bool,
) -> CategorySeed {
    CategorySeed {
        id,
        name,
        color,
        emoji,
        is_hidden,
    }
}

const CATEGORIES: &[CategorySeed] = &[
    category("cat_1", "Sales Revenue", "#22c55e", "💰", false),
    category("cat_2", "Software & Subscriptions", "#6366f1", "💻", false),
    category("cat_3", "Meals & Entertainment", "#f97316", "🍽", false),
    category("cat_4", "Travel", "#0ea5e9", "✈", false),
    category("cat_5", "Office Supplies", "#a855f7", "📎", false),
    category("cat_6", "Marketing", "#ec4899", "📣", false),
    category("cat_7", "Rent & Utilities", "#64748b", "🏢", false),
    category("cat_8", "Payroll", "#14b8a6", "👥", false),
    category("cat_9", "Professional Services", "#eab308", "💼", false),
    category("cat_10", "Transportation", "#84cc16", "🚗", false),
    category("cat_11", "Bank Fees", "#ef4444", "🏦", false),
    category("cat_12", "Insurance", "#06b6d4", "🛡", false),
    category("cat_13", "Refunds & Other Income", "#10b981", "↩", false),
    category("cat_14", "Personal Expenses", "#9ca3af", "🙈", true),
];

/// Accounts and categories known to the dashboard, with sentinel-backed lookups.
#[derive(Debug, Clone)]
pub struct Catalog {
    accounts: Vec<Account>,
    categories: Vec<Category>,
    uncategorized: Category,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    pub fn new(accounts: Vec<Account>, categories: Vec<Category>) -> Self {
        Self {
            accounts,
            categories,
            uncategorized: Category {
                id: UNCATEGORIZED_ID.to_string(),
                name: "Uncategorized".to_string(),
                color: "#94a3b8".to_string(),
                emoji: "❔".to_string(),
                parent_id: None,
                is_hidden: false,
            },
        }
    }

    /// The built-in demo accounts and categories.
    pub fn standard() -> Self {
        let accounts = ACCOUNTS
            .iter()
            .map(|a| Account {
                id: a.id.to_string(),
                name: a.name.to_string(),
                institution: a.institution.to_string(),
                account_type: a.account_type,
                last_four: a.last_four.to_string(),
            })
            .collect();
        let categories = CATEGORIES
            .iter()
            .map(|c| Category {
                id: c.id.to_string(),
                name: c.name.to_string(),
                color: c.color.to_string(),
                emoji: c.emoji.to_string(),
                parent_id: None,
                is_hidden: c.is_hidden,
            })
            .collect();
        Self::new(accounts, categories)
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Categories offered in pickers: everything not hidden, plus the sentinel last.
    pub fn pickable_categories(&self) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|c| !c.is_hidden)
            .chain(std::iter::once(&self.uncategorized))
            .collect()
    }

    pub fn lookup_account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn account_name(&self, id: &str) -> &str {
        self.lookup_account(id)
            .map(|a| a.name.as_str())
            .unwrap_or(UNKNOWN_ACCOUNT)
    }

    /// Never fails: a null or unknown id resolves to the "Uncategorized" sentinel.
    pub fn lookup_category(&self, id: Option<&str>) -> &Category {
        id.and_then(|id| self.categories.iter().find(|c| c.id == id))
            .unwrap_or(&self.uncategorized)
    }

    /// Resolve a command-line reference: exact id first, then case-insensitive name.
    pub fn find_account(&self, query: &str) -> Option<&Account> {
        let q = query.trim();
        self.lookup_account(q).or_else(|| {
            self.accounts
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(q))
        })
    }

    pub fn find_category(&self, query: &str) -> Option<&Category> {
        let q = query.trim();
        if q.eq_ignore_ascii_case(UNCATEGORIZED_ID) {
            return Some(&self.uncategorized);
        }
        self.categories
            .iter()
            .find(|c| c.id == q)
            .or_else(|| self.categories.iter().find(|c| c.name.eq_ignore_ascii_case(q)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_category_null_is_sentinel() {
        let catalog = Catalog::standard();
        let cat = catalog.lookup_category(None);
        assert_eq!(cat.id, UNCATEGORIZED_ID);
        assert_eq!(cat.name, "Uncategorized");
    }

    #[test]
    fn test_lookup_category_unknown_is_sentinel() {
        let catalog = Catalog::standard();
        let cat = catalog.lookup_category(Some("nonexistent_id"));
        assert_eq!(cat.id, UNCATEGORIZED_ID);
    }

    #[test]
    fn test_lookup_category_known() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.lookup_category(Some("cat_2")).name, "Software & Subscriptions");
    }

    #[test]
    fn test_unknown_account_name() {
        let catalog = Catalog::standard();
        assert!(catalog.lookup_account("acc_99").is_none());
        assert_eq!(catalog.account_name("acc_99"), UNKNOWN_ACCOUNT);
        assert_eq!(catalog.account_name("acc_1"), "Business Checking");
    }

    #[test]
    fn test_pickable_categories_skip_hidden() {
        let catalog = Catalog::standard();
        let picks = catalog.pickable_categories();
        assert!(picks.iter().all(|c| !c.is_hidden));
        assert!(!picks.iter().any(|c| c.name == "Personal Expenses"));
        assert_eq!(picks.last().unwrap().id, UNCATEGORIZED_ID);
    }

    #[test]
    fn test_find_by_id_or_name() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.find_account("business savings").unwrap().id, "acc_2");
        assert_eq!(catalog.find_account("acc_3").unwrap().name, "Amex Business Gold");
        assert_eq!(catalog.find_category("TRAVEL").unwrap().id, "cat_4");
        assert_eq!(catalog.find_category("uncategorized").unwrap().id, UNCATEGORIZED_ID);
        assert!(catalog.find_category("Nope").is_none());
    }
}

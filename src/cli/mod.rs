pub mod accounts;
pub mod browse;
pub mod categories;
pub mod dashboard;
pub mod list;
pub mod periods;

use chrono::{Local, NaiveDate};
use clap::builder::RangedU64ValueParser;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::cards::DashboardVariant;
use crate::error::{BipsError, Result};
use crate::filters::{AmountRange, DateRange, FilterState};
use crate::mock::demo_store;
use crate::mock::periods::MAX_PERIODS;
use crate::mock::transactions::MAX_TRANSACTION_COUNT;
use crate::models::{Granularity, TransactionStatus};
use crate::settings::{load_settings, Settings};
use crate::sorting::{SortDirection, SortField, SortState};
use crate::store::TransactionStore;

#[derive(Parser)]
#[command(
    name = "bips",
    version,
    about = "Small-business financial dashboard over generated mock books."
)]
pub struct Cli {
    /// Seed for the mock data generator (default: from settings)
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// Number of mock transactions to generate (default: from settings)
    #[arg(long, global = true, value_parser = count_parser())]
    pub count: Option<usize>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

fn count_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(0..=MAX_TRANSACTION_COUNT as u64)
}

fn last_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..=MAX_PERIODS as u64)
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard (the default).
    Dashboard {
        /// Card layout: overview, trends, ledger
        #[arg(long)]
        variant: Option<DashboardVariant>,
    },
    /// Interactively browse, filter and bulk-edit transactions.
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Print transactions as a table or JSON.
    List {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        sort: SortArgs,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Revenue, costs, net income and cash per period.
    Periods {
        /// monthly, quarterly or yearly
        #[arg(long, default_value = "monthly")]
        granularity: Granularity,
        /// How many periods to show (default depends on granularity)
        #[arg(long, value_parser = last_parser())]
        last: Option<usize>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List accounts.
    Accounts,
    /// List categories.
    Categories {
        /// Include hidden categories
        #[arg(long)]
        all: bool,
    },
    /// Print a shell completion script.
    Completions {
        /// bash, zsh, fish, elvish or powershell
        shell: Shell,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Case-insensitive text in merchant, description or notes
    #[arg(long)]
    pub search: Option<String>,
    /// Start date: YYYY-MM-DD
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD
    #[arg(long = "to")]
    pub to_date: Option<String>,
    /// Account id or name (repeatable)
    #[arg(long)]
    pub account: Vec<String>,
    /// Category id or name, or 'uncategorized' (repeatable)
    #[arg(long)]
    pub category: Vec<String>,
    /// pending or posted (repeatable)
    #[arg(long)]
    pub status: Vec<TransactionStatus>,
    /// Smallest expense to include, as a positive amount
    #[arg(long)]
    pub min: Option<f64>,
    /// Largest expense to include, as a positive amount
    #[arg(long)]
    pub max: Option<f64>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SortArgs {
    /// date, merchant, amount or category
    #[arg(long)]
    pub sort: Option<SortField>,
    /// Sort ascending (default is descending)
    #[arg(long)]
    pub asc: bool,
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| BipsError::InvalidDate(s.to_string()))
}

impl FilterArgs {
    /// Resolve names against the catalog. Unknown accounts or categories are errors.
    pub fn to_filter(&self, store: &TransactionStore) -> Result<FilterState> {
        let catalog = store.catalog();
        let accounts = self
            .account
            .iter()
            .map(|a| {
                catalog
                    .find_account(a)
                    .map(|acc| acc.id.clone())
                    .ok_or_else(|| BipsError::UnknownAccount(a.clone()))
            })
            .collect::<Result<_>>()?;
        let categories = self
            .category
            .iter()
            .map(|c| {
                catalog
                    .find_category(c)
                    .map(|cat| cat.id.clone())
                    .ok_or_else(|| BipsError::UnknownCategory(c.clone()))
            })
            .collect::<Result<_>>()?;

        Ok(FilterState {
            search: self.search.clone().unwrap_or_default(),
            date_range: DateRange {
                from: self.from_date.as_deref().map(parse_date).transpose()?,
                to: self.to_date.as_deref().map(parse_date).transpose()?,
            },
            accounts,
            categories,
            statuses: self.status.iter().copied().collect(),
            amount_range: AmountRange {
                min: self.min,
                max: self.max,
            },
        })
    }
}

impl SortArgs {
    pub fn to_sort(&self) -> SortState {
        let direction = if self.asc {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        SortState::new(self.sort.unwrap_or(SortField::Date), direction)
    }
}

/// Settings merged with command-line overrides for one run.
pub struct RunContext {
    pub settings: Settings,
    pub seed: u64,
    pub count: usize,
    pub today: NaiveDate,
}

impl RunContext {
    pub fn new(cli: &Cli) -> Self {
        let settings = load_settings();
        Self {
            seed: cli.seed.unwrap_or(settings.seed),
            count: cli.count.unwrap_or(settings.transaction_count),
            today: Local::now().date_naive(),
            settings,
        }
    }

    pub fn store(&self) -> TransactionStore {
        demo_store(self.seed, self.count, self.today)
    }

    /// A store with the filter and sort from the command line already applied.
    pub fn filtered_store(
        &self,
        filters: &FilterArgs,
        sort: &SortArgs,
    ) -> Result<TransactionStore> {
        let mut store = self.store();
        let filter = filters.to_filter(&store)?;
        store.set_filter(filter);
        store.set_sort(sort.to_sort());
        Ok(store)
    }
}

pub fn completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "bips", &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::test_utils::txns;

    fn store() -> TransactionStore {
        TransactionStore::new(txns(3), Catalog::standard())
    }

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["bips"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.seed.is_none());
    }

    #[test]
    fn test_cli_parses_list_filters() {
        let cli = Cli::try_parse_from([
            "bips", "list", "--search", "uber", "--status", "pending", "--status", "posted",
            "--account", "Business Checking", "--sort", "amount", "--asc", "--seed", "7",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(7));
        let Some(Commands::List { filters, sort, json }) = cli.command else {
            panic!("expected list");
        };
        assert!(!json);
        assert_eq!(filters.status.len(), 2);
        assert_eq!(sort.to_sort(), SortState::new(SortField::Amount, SortDirection::Ascending));

        let f = filters.to_filter(&store()).unwrap();
        assert_eq!(f.search, "uber");
        assert!(f.accounts.contains("acc_1"));
    }

    #[test]
    fn test_bad_enum_values_rejected() {
        assert!(Cli::try_parse_from(["bips", "list", "--status", "cleared"]).is_err());
        assert!(Cli::try_parse_from(["bips", "dashboard", "--variant", "grid"]).is_err());
        assert!(Cli::try_parse_from(["bips", "periods", "--granularity", "weekly"]).is_err());
    }

    #[test]
    fn test_filter_args_resolve_names() {
        let args = FilterArgs {
            category: vec!["travel".to_string(), "uncategorized".to_string()],
            from_date: Some("2025-01-01".to_string()),
            min: Some(10.0),
            ..Default::default()
        };
        let f = args.to_filter(&store()).unwrap();
        assert!(f.categories.contains("cat_4"));
        assert!(f.categories.contains(crate::catalog::UNCATEGORIZED_ID));
        assert_eq!(f.date_range.from, Some(parse_date("2025-01-01").unwrap()));
        assert_eq!(f.amount_range.min, Some(10.0));
    }

    #[test]
    fn test_filter_args_unknown_names() {
        let args = FilterArgs {
            account: vec!["Swiss Vault".to_string()],
            ..Default::default()
        };
        assert!(matches!(args.to_filter(&store()), Err(BipsError::UnknownAccount(_))));

        let args = FilterArgs {
            category: vec!["Yachts".to_string()],
            ..Default::default()
        };
        assert!(matches!(args.to_filter(&store()), Err(BipsError::UnknownCategory(_))));
    }

    #[test]
    fn test_bad_date() {
        let args = FilterArgs {
            to_date: Some("03/01/2025".to_string()),
            ..Default::default()
        };
        assert!(matches!(args.to_filter(&store()), Err(BipsError::InvalidDate(_))));
    }

    #[test]
    fn test_count_and_last_are_bounded() {
        let cli = Cli::try_parse_from(["bips", "--count", "10000", "list"]).unwrap();
        assert_eq!(cli.count, Some(MAX_TRANSACTION_COUNT));
        assert!(Cli::try_parse_from(["bips", "--count", "100000000000000000", "list"]).is_err());
        assert!(Cli::try_parse_from(["bips", "list", "--count", "-1"]).is_err());

        let cli = Cli::try_parse_from(["bips", "periods", "--last", "600"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Periods { last: Some(600), .. })));
        assert!(Cli::try_parse_from(["bips", "periods", "--last", "0"]).is_err());
        assert!(Cli::try_parse_from(["bips", "periods", "--last", "200000000"]).is_err());
    }

    #[test]
    fn test_cli_debug_asserts() {
        Cli::command().debug_assert();
    }
}

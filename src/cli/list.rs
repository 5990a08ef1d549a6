use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use serde::Serialize;

use super::{FilterArgs, RunContext, SortArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::models::{CategorySource, TransactionStatus};
use crate::store::TransactionStore;

/// One transaction as printed by `list --json`, with names resolved.
#[derive(Debug, Serialize)]
pub struct ListRow<'a> {
    pub id: &'a str,
    pub date: String,
    pub merchant: &'a str,
    pub description: &'a str,
    pub amount: f64,
    pub account: &'a str,
    pub category: &'a str,
    pub category_id: Option<&'a str>,
    pub category_source: CategorySource,
    pub status: TransactionStatus,
    pub notes: &'a str,
    pub hidden: bool,
}

pub fn rows(store: &TransactionStore) -> Vec<ListRow<'_>> {
    let catalog = store.catalog();
    store
        .view()
        .into_iter()
        .map(|t| ListRow {
            id: &t.id,
            date: t.date.format("%Y-%m-%d").to_string(),
            merchant: &t.merchant,
            description: &t.description,
            amount: t.amount,
            account: catalog.account_name(&t.account_id),
            category: &catalog.lookup_category(t.category_id.as_deref()).name,
            category_id: t.category_id.as_deref(),
            category_source: t.category_source,
            status: t.status,
            notes: &t.notes,
            hidden: t.is_hidden,
        })
        .collect()
}

pub fn format_json(store: &TransactionStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(&rows(store))?)
}

pub fn format_table(store: &TransactionStore) -> String {
    let view = rows(store);
    if view.is_empty() {
        return "No transactions match.".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Merchant", "Category", "Account", "Status", "Amount"]);
    for r in &view {
        let amount = if r.amount < 0.0 {
            money(r.amount).red().to_string()
        } else {
            money(r.amount).green().to_string()
        };
        let status = match r.status {
            TransactionStatus::Pending => r.status.label().yellow().to_string(),
            TransactionStatus::Posted => r.status.label().to_string(),
        };
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.date),
            Cell::new(r.merchant),
            Cell::new(r.category),
            Cell::new(r.account),
            Cell::new(status),
            Cell::new(amount).set_alignment(CellAlignment::Right),
        ]);
    }

    let totals = store.totals();
    let filters = store.filter().describe();
    let mut out = format!("{table}\n");
    out.push_str(&format!(
        "{} row(s), sorted by {} | Income {} | Expenses {} | Net {}",
        view.len(),
        store.sort(),
        money(totals.income),
        money(totals.expenses),
        money(totals.net).bold()
    ));
    if !filters.is_empty() {
        out.push_str(&format!("\nFilters: {filters}"));
    }
    out
}

pub fn run(ctx: &RunContext, filters: &FilterArgs, sort: &SortArgs, json: bool) -> Result<()> {
    let store = ctx.filtered_store(filters, sort)?;
    if json {
        println!("{}", format_json(&store)?);
    } else {
        println!("{}", format_table(&store));
    }
    Ok(())
}

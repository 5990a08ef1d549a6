use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::error::Result;
use crate::fmt::{money, percent_change};
use crate::mock::periods::{
    default_count, generate_periods, period_to_date, PeriodComparison, DEFAULT_MONTHS,
};
use crate::models::{FinancialPeriod, Granularity};

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

pub fn format_periods(periods: &[FinancialPeriod]) -> String {
    if periods.is_empty() {
        return "No periods.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Period", "Revenue", "Costs", "Net Income", "Cash on Hand"]);
    for p in periods {
        let net = if p.is_loss() {
            money(p.net_income).red().bold().to_string()
        } else {
            money(p.net_income).green().to_string()
        };
        table.add_row(vec![
            Cell::new(&p.label),
            right(money(p.revenue)),
            right(money(p.costs)),
            right(net),
            right(money(p.cash_on_hand)),
        ]);
    }

    let mut out = table.to_string();
    let losses: Vec<&str> = periods
        .iter()
        .filter(|p| p.is_loss())
        .map(|p| p.label.as_str())
        .collect();
    if !losses.is_empty() {
        out.push_str(&format!("\n{} {}", "Loss:".red().bold(), losses.join(", ")));
    }
    out
}

pub fn format_comparison(cmp: &PeriodComparison) -> String {
    let change = cmp
        .revenue_change_pct()
        .map(percent_change)
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "{} to date (day {}): revenue {} vs {} in {} ({change}), net {} vs {}",
        cmp.current_label,
        cmp.elapsed_days,
        money(cmp.revenue),
        money(cmp.previous_revenue),
        cmp.previous_label,
        money(cmp.net_income),
        money(cmp.previous_net_income),
    )
}

pub fn run(
    granularity: Granularity,
    last: Option<usize>,
    json: bool,
    today: NaiveDate,
) -> Result<()> {
    let count = last.unwrap_or_else(|| default_count(granularity));
    let periods = generate_periods(granularity, today, count);
    if json {
        println!("{}", serde_json::to_string_pretty(&periods)?);
        return Ok(());
    }
    println!("{}", format_periods(&periods));
    if granularity == Granularity::Monthly {
        let monthly = generate_periods(Granularity::Monthly, today, DEFAULT_MONTHS);
        if let Some(cmp) = period_to_date(&monthly, today) {
            println!("{}", format_comparison(&cmp));
        }
    }
    Ok(())
}

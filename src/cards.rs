use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use serde::{Deserialize, Serialize};

use crate::error::BipsError;
use crate::fmt::{format_k, money, percent_change, y_axis_ticks};
use crate::mock::periods::PeriodComparison;
use crate::models::{FinancialPeriod, Transaction};
use crate::store::TransactionStore;
use crate::tui::{money_span, AMOUNT_NEG_STYLE, AMOUNT_POS_STYLE, FOOTER_STYLE};

const RECENT_ROWS: usize = 8;
const TOP_CATEGORIES: usize = 5;

/// Which set of cards the dashboard shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardVariant {
    #[default]
    Overview,
    Trends,
    Ledger,
}

impl DashboardVariant {
    pub const ALL: [DashboardVariant; 3] = [
        DashboardVariant::Overview,
        DashboardVariant::Trends,
        DashboardVariant::Ledger,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DashboardVariant::Overview => "Overview",
            DashboardVariant::Trends => "Trends",
            DashboardVariant::Ledger => "Ledger",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DashboardVariant::Overview => DashboardVariant::Trends,
            DashboardVariant::Trends => DashboardVariant::Ledger,
            DashboardVariant::Ledger => DashboardVariant::Overview,
        }
    }

    /// Cards in reveal order. Stat cards first, then panels.
    pub fn cards(self) -> &'static [CardKind] {
        match self {
            DashboardVariant::Overview => &[
                CardKind::Revenue,
                CardKind::Costs,
                CardKind::NetIncome,
                CardKind::CashOnHand,
                CardKind::CashFlowChart,
                CardKind::RecentTransactions,
            ],
            DashboardVariant::Trends => &[
                CardKind::Revenue,
                CardKind::NetIncome,
                CardKind::CashFlowChart,
                CardKind::TopCategories,
            ],
            DashboardVariant::Ledger => &[
                CardKind::CashOnHand,
                CardKind::NetIncome,
                CardKind::RecentTransactions,
                CardKind::TopCategories,
            ],
        }
    }
}

impl fmt::Display for DashboardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DashboardVariant {
    type Err = BipsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overview" => Ok(DashboardVariant::Overview),
            "trends" => Ok(DashboardVariant::Trends),
            "ledger" => Ok(DashboardVariant::Ledger),
            other => Err(BipsError::InvalidValue {
                kind: "dashboard variant",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Revenue,
    Costs,
    NetIncome,
    CashOnHand,
    CashFlowChart,
    RecentTransactions,
    TopCategories,
}

/// Everything a card may draw from.
pub struct CardContext<'a> {
    pub store: &'a TransactionStore,
    pub monthly: &'a [FinancialPeriod],
    pub comparison: Option<&'a PeriodComparison>,
}

impl CardKind {
    pub fn title(self) -> &'static str {
        match self {
            CardKind::Revenue => "Revenue",
            CardKind::Costs => "Costs",
            CardKind::NetIncome => "Net Income",
            CardKind::CashOnHand => "Cash on Hand",
            CardKind::CashFlowChart => "Monthly Cash Flow",
            CardKind::RecentTransactions => "Recent Transactions",
            CardKind::TopCategories => "Top Expense Categories",
        }
    }

    /// Single-figure cards laid out in the top row.
    pub fn is_stat(self) -> bool {
        matches!(
            self,
            CardKind::Revenue | CardKind::Costs | CardKind::NetIncome | CardKind::CashOnHand
        )
    }

    pub fn render(self, frame: &mut Frame, area: Rect, ctx: &CardContext) {
        let block = Block::default()
            .title(format!(" {} ", self.title()))
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match self {
            CardKind::Revenue => {
                render_stat(frame, inner, ctx.monthly, |p| p.revenue, ctx.comparison)
            }
            CardKind::Costs => render_stat(frame, inner, ctx.monthly, |p| -p.costs, None),
            CardKind::NetIncome => render_stat(frame, inner, ctx.monthly, |p| p.net_income, None),
            CardKind::CashOnHand => {
                render_stat(frame, inner, ctx.monthly, |p| p.cash_on_hand, None)
            }
            CardKind::CashFlowChart => render_cash_flow(frame, inner, ctx.monthly),
            CardKind::RecentTransactions => render_recent(frame, inner, ctx.store),
            CardKind::TopCategories => render_top_categories(frame, inner, ctx.store),
        }
    }

    /// Empty frame shown before the intro animation reaches this card.
    pub fn render_placeholder(self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(40, 40, 40)));
        frame.render_widget(block, area);
    }
}

fn render_stat(
    frame: &mut Frame,
    area: Rect,
    monthly: &[FinancialPeriod],
    figure: impl Fn(&FinancialPeriod) -> f64,
    comparison: Option<&PeriodComparison>,
) {
    let Some(current) = monthly.last() else {
        frame.render_widget(Paragraph::new(" No data").style(FOOTER_STYLE), area);
        return;
    };
    let value = figure(current);
    let mut lines = vec![
        Line::from(vec![Span::raw(" "), money_span(value)]),
        Line::from(Span::styled(format!(" {}", current.label), FOOTER_STYLE)),
    ];

    if let Some(cmp) = comparison {
        if let Some(pct) = cmp.revenue_change_pct() {
            let style = if pct < 0.0 { AMOUNT_NEG_STYLE } else { AMOUNT_POS_STYLE };
            lines.push(Line::from(vec![
                Span::styled(format!(" {}", percent_change(pct)), style),
                Span::styled(
                    format!(" vs {} to day {}", cmp.previous_label, cmp.elapsed_days),
                    FOOTER_STYLE,
                ),
            ]));
        }
    } else if let [.., previous, _] = monthly {
        let delta = value - figure(previous);
        let style = if delta < 0.0 { AMOUNT_NEG_STYLE } else { AMOUNT_POS_STYLE };
        let sign = if delta < 0.0 { "-" } else { "+" };
        lines.push(Line::from(vec![
            Span::styled(format!(" {sign}{}", money(delta.abs())), style),
            Span::styled(format!(" vs {}", previous.label), FOOTER_STYLE),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_cash_flow(frame: &mut Frame, area: Rect, monthly: &[FinancialPeriod]) {
    if monthly.is_empty() {
        return;
    }
    let max_val = monthly
        .iter()
        .map(|p| p.revenue.max(p.costs))
        .fold(1.0_f64, f64::max);

    let (top_tick, mid_tick) = y_axis_ticks(max_val);
    let top_label = format_k(top_tick);
    let mid_label = format_k(mid_tick);
    let y_label_width = top_label.len().max(mid_label.len()) as u16 + 1;

    let [y_axis_area, bar_area] =
        Layout::horizontal([Constraint::Length(y_label_width), Constraint::Fill(1)]).areas(area);

    let inner_height = bar_area.height.saturating_sub(1); // month labels
    let mid_row = inner_height / 2;
    let y_lines: Vec<Line> = (0..inner_height)
        .map(|row| {
            let label = if row == 0 {
                top_label.as_str()
            } else if row == mid_row {
                mid_label.as_str()
            } else {
                ""
            };
            Line::from(Span::styled(
                format!("{:>width$}", label, width = y_label_width as usize),
                FOOTER_STYLE,
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(y_lines), y_axis_area);

    // Fit as many of the latest months as the width allows: 2 bars + 1 gap each.
    let fit = (bar_area.width as usize / 5).max(1);
    let shown = &monthly[monthly.len().saturating_sub(fit)..];

    let mut chart = BarChart::default().bar_width(2).bar_gap(0).group_gap(1).max(top_tick as u64);
    for p in shown {
        let revenue_style = AMOUNT_POS_STYLE;
        let cost_style = if p.is_loss() {
            AMOUNT_NEG_STYLE.add_modifier(Modifier::BOLD)
        } else {
            AMOUNT_NEG_STYLE
        };
        let bars = [
            Bar::default()
                .value(p.revenue.max(0.0) as u64)
                .text_value(String::new())
                .style(revenue_style),
            Bar::default()
                .value(p.costs.max(0.0) as u64)
                .text_value(String::new())
                .style(cost_style),
        ];
        let label = p.start.format("%b").to_string();
        chart = chart.data(BarGroup::default().label(Line::from(label)).bars(&bars));
    }
    frame.render_widget(chart, bar_area);
}

/// Newest non-deleted transactions regardless of the browser's sort.
pub fn recent_transactions(store: &TransactionStore, n: usize) -> Vec<&Transaction> {
    let mut rows: Vec<&Transaction> = store
        .transactions()
        .iter()
        .filter(|t| !t.is_deleted)
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows.truncate(n);
    rows
}

fn render_recent(frame: &mut Frame, area: Rect, store: &TransactionStore) {
    let rows = recent_transactions(store, RECENT_ROWS.min(area.height as usize));
    let merchant_width = (area.width as usize).saturating_sub(22).clamp(8, 28);
    let lines: Vec<Line> = rows
        .iter()
        .map(|t| {
            let style = if t.is_hidden { FOOTER_STYLE } else { Style::default() };
            Line::from(vec![
                Span::styled(format!(" {} ", t.date.format("%m/%d")), FOOTER_STYLE),
                Span::styled(
                    format!("{:<width$.width$} ", t.merchant, width = merchant_width),
                    style,
                ),
                money_span(t.amount),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// Expense totals (as positive numbers) by effective category, largest first.
/// Deleted and hidden rows are left out.
pub fn top_categories(store: &TransactionStore, n: usize) -> Vec<(String, f64)> {
    let catalog = store.catalog();
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for t in store
        .transactions()
        .iter()
        .filter(|t| !t.is_deleted && !t.is_hidden && t.is_expense())
    {
        let name = catalog.lookup_category(t.category_id.as_deref()).name.as_str();
        *totals.entry(name).or_default() += t.amount.abs();
    }
    let mut out: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(name, total)| (name.to_string(), (total * 100.0).round() / 100.0))
        .collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out.truncate(n);
    out
}

fn render_top_categories(frame: &mut Frame, area: Rect, store: &TransactionStore) {
    let top = top_categories(store, TOP_CATEGORIES);
    let name_width = top.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(10);
    let lines: Vec<Line> = top
        .iter()
        .map(|(name, val)| {
            Line::from(vec![
                Span::raw(format!(" {:<width$}  ", name, width = name_width)),
                money_span(-val),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::test_utils::{date, txn};

    #[test]
    fn test_variant_cycle() {
        let mut v = DashboardVariant::Overview;
        for _ in 0..3 {
            v = v.next();
        }
        assert_eq!(v, DashboardVariant::Overview);
        assert_eq!(DashboardVariant::Overview.next(), DashboardVariant::Trends);
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("Ledger".parse::<DashboardVariant>().unwrap(), DashboardVariant::Ledger);
        assert!("grid".parse::<DashboardVariant>().is_err());
    }

    #[test]
    fn test_every_variant_has_cards() {
        for v in DashboardVariant::ALL {
            assert!(!v.cards().is_empty());
            assert!(v.cards().iter().any(|c| !c.is_stat()), "{v} has no panel");
        }
    }

    #[test]
    fn test_top_categories_groups_and_skips_hidden() {
        let mut a = txn("a", -100.0);
        a.category_id = Some("cat_4".to_string());
        let mut b = txn("b", -50.0);
        b.category_id = Some("cat_4".to_string());
        let c = txn("c", -80.0); // cat_2
        let mut d = txn("d", -500.0);
        d.is_hidden = true;
        let mut e = txn("e", -10.0);
        e.category_id = None;
        let income = txn("f", 900.0);
        let store = TransactionStore::new(vec![a, b, c, d, e, income], Catalog::standard());

        let top = top_categories(&store, 5);
        assert_eq!(
            top,
            vec![
                ("Travel".to_string(), 150.0),
                ("Software & Subscriptions".to_string(), 80.0),
                ("Uncategorized".to_string(), 10.0),
            ]
        );
    }

    #[test]
    fn test_recent_transactions_newest_first() {
        let mut a = txn("a", -1.0);
        a.date = date("2025-01-01");
        let mut b = txn("b", -1.0);
        b.date = date("2025-03-01");
        let mut c = txn("c", -1.0);
        c.date = date("2025-02-01");
        c.is_deleted = true;
        let store = TransactionStore::new(vec![a, b, c], Catalog::standard());
        let ids: Vec<&str> = recent_transactions(&store, 5).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}

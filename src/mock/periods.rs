use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{FinancialPeriod, Granularity};

pub const DEFAULT_MONTHS: usize = 12;
pub const DEFAULT_QUARTERS: usize = 4;
pub const DEFAULT_YEARS: usize = 3;
/// Upper bound on how many periods one call will generate.
pub const MAX_PERIODS: usize = 600;

const BASE_REVENUE: f64 = 42_000.0;
const OPENING_CASH: f64 = 85_000.0;
/// The loss month sits this many months before the current one.
const LOSS_MONTH_OFFSET: i32 = 4;

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Months since year 0. Variance is keyed on this so the same calendar month
/// gets the same figures at every granularity.
fn month_index(year: i32, month0: u32) -> i32 {
    year * 12 + month0 as i32
}

fn from_month_index(index: i32) -> (i32, u32) {
    (index.div_euclid(12), index.rem_euclid(12) as u32)
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn month_bounds(index: i32) -> Option<(NaiveDate, NaiveDate)> {
    let (year, month0) = from_month_index(index);
    let month = month0 + 1;
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = NaiveDate::from_ymd_opt(year, month, last_day_of_month(year, month))?;
    Some((start, end))
}

fn month_figures(index: i32, loss_index: i32) -> (f64, f64) {
    let i = index as f64;
    let seasonal =
        1.0 + 0.12 * (i * 0.9).sin() + 0.05 * (i * 2.3 + 1.0).sin() + 0.08 * (i * 0.21).sin();
    let revenue = BASE_REVENUE * seasonal;
    let cost_ratio = if index == loss_index {
        1.12 + 0.03 * (i * 0.7).sin()
    } else {
        0.72 + 0.06 * (i * 1.3 + 0.5).sin()
    };
    (round_cents(revenue), round_cents(revenue * cost_ratio))
}

/// Consecutive months `first..=last` (month indices), oldest first, with a
/// running cash balance starting from a fixed opening amount.
fn monthly_series(first: i32, last: i32, loss_index: i32) -> Vec<FinancialPeriod> {
    let mut cash = OPENING_CASH;
    let mut out = Vec::new();
    for index in first..=last {
        let Some((start, end)) = month_bounds(index) else {
            continue;
        };
        let (revenue, costs) = month_figures(index, loss_index);
        let net_income = round_cents(revenue - costs);
        cash = round_cents(cash + net_income);
        out.push(FinancialPeriod {
            label: start.format("%b %Y").to_string(),
            granularity: Granularity::Monthly,
            start,
            end,
            revenue,
            costs,
            net_income,
            cash_on_hand: cash,
        });
    }
    out
}

fn aggregate<K: PartialEq>(
    months: Vec<FinancialPeriod>,
    granularity: Granularity,
    key: impl Fn(&FinancialPeriod) -> K,
    label: impl Fn(&FinancialPeriod) -> String,
) -> Vec<FinancialPeriod> {
    let mut out: Vec<FinancialPeriod> = Vec::new();
    let mut current_key: Option<K> = None;
    for m in months {
        let k = key(&m);
        if current_key.as_ref() == Some(&k) {
            if let Some(p) = out.last_mut() {
                p.end = m.end;
                p.revenue = round_cents(p.revenue + m.revenue);
                p.costs = round_cents(p.costs + m.costs);
                p.net_income = round_cents(p.net_income + m.net_income);
                p.cash_on_hand = m.cash_on_hand;
                continue;
            }
        }
        out.push(FinancialPeriod {
            label: label(&m),
            granularity,
            ..m
        });
        current_key = Some(k);
    }
    out
}

/// `count` periods ending with the one containing `today`, oldest first. The
/// current period is only as complete as the mock months in it. `count` is
/// capped at [`MAX_PERIODS`].
pub fn generate_periods(
    granularity: Granularity,
    today: NaiveDate,
    count: usize,
) -> Vec<FinancialPeriod> {
    if count == 0 {
        return Vec::new();
    }
    // Fits in i32 after the cap.
    let count = count.min(MAX_PERIODS) as i32;
    let last = month_index(today.year(), today.month0());
    let loss_index = last - LOSS_MONTH_OFFSET;

    match granularity {
        Granularity::Monthly => monthly_series(last - (count - 1), last, loss_index),
        Granularity::Quarterly => {
            let quarter_start = last - (today.month0() % 3) as i32;
            let first = quarter_start - (count - 1) * 3;
            aggregate(
                monthly_series(first, last, loss_index),
                Granularity::Quarterly,
                |p| (p.start.year(), p.start.month0() / 3),
                |p| format!("Q{} {}", p.start.month0() / 3 + 1, p.start.year()),
            )
        }
        Granularity::Yearly => {
            let first = month_index(today.year() - (count - 1), 0);
            aggregate(
                monthly_series(first, last, loss_index),
                Granularity::Yearly,
                |p| p.start.year(),
                |p| p.start.year().to_string(),
            )
        }
    }
}

pub fn default_count(granularity: Granularity) -> usize {
    match granularity {
        Granularity::Monthly => DEFAULT_MONTHS,
        Granularity::Quarterly => DEFAULT_QUARTERS,
        Granularity::Yearly => DEFAULT_YEARS,
    }
}

/// Current month so far against the same elapsed share of the previous month.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparison {
    pub current_label: String,
    pub previous_label: String,
    pub elapsed_days: u32,
    pub revenue: f64,
    pub previous_revenue: f64,
    pub net_income: f64,
    pub previous_net_income: f64,
}

impl PeriodComparison {
    /// Percent change in revenue, `None` when the previous figure is zero.
    pub fn revenue_change_pct(&self) -> Option<f64> {
        if self.previous_revenue == 0.0 {
            None
        } else {
            Some((self.revenue - self.previous_revenue) / self.previous_revenue.abs() * 100.0)
        }
    }
}

/// Needs at least two monthly periods, the last one containing `today`.
pub fn period_to_date(monthly: &[FinancialPeriod], today: NaiveDate) -> Option<PeriodComparison> {
    let [.., previous, current] = monthly else {
        return None;
    };
    if today < current.start || today > current.end {
        return None;
    }
    let elapsed_days = today.day();
    let current_len = current.end.day() as f64;
    let previous_len = previous.end.day() as f64;
    let fraction = elapsed_days as f64 / current_len;
    // Same fraction of the previous month, by its own length.
    let previous_fraction = (fraction * previous_len).round() / previous_len;

    Some(PeriodComparison {
        current_label: current.label.clone(),
        previous_label: previous.label.clone(),
        elapsed_days,
        revenue: round_cents(current.revenue * fraction),
        previous_revenue: round_cents(previous.revenue * previous_fraction),
        net_income: round_cents(current.net_income * fraction),
        previous_net_income: round_cents(previous.net_income * previous_fraction),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn test_monthly_shape() {
        let periods = generate_periods(Granularity::Monthly, date("2025-06-15"), 12);
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].label, "Jul 2024");
        assert_eq!(periods[11].label, "Jun 2025");
        assert_eq!(periods[11].start, date("2025-06-01"));
        assert_eq!(periods[11].end, date("2025-06-30"));
        for p in &periods {
            assert!(p.revenue > 0.0);
            assert!(p.costs > 0.0);
            assert!((p.net_income - (p.revenue - p.costs)).abs() < 0.011);
        }
    }

    #[test]
    fn test_exactly_one_loss_month() {
        let periods = generate_periods(Granularity::Monthly, date("2025-06-15"), 12);
        let losses: Vec<&str> = periods
            .iter()
            .filter(|p| p.is_loss())
            .map(|p| p.label.as_str())
            .collect();
        assert_eq!(losses, vec!["Feb 2025"]);
    }

    #[test]
    fn test_cash_is_running_balance() {
        let periods = generate_periods(Granularity::Monthly, date("2025-06-15"), 12);
        let mut cash = OPENING_CASH;
        for p in &periods {
            cash += p.net_income;
            assert!((p.cash_on_hand - cash).abs() < 0.05, "{}", p.label);
        }
        let loss = periods.iter().position(|p| p.is_loss()).unwrap();
        assert!(periods[loss].cash_on_hand < periods[loss - 1].cash_on_hand);
    }

    #[test]
    fn test_deterministic() {
        let a = generate_periods(Granularity::Monthly, date("2025-06-15"), 6);
        let b = generate_periods(Granularity::Monthly, date("2025-06-02"), 6);
        let ra: Vec<f64> = a.iter().map(|p| p.revenue).collect();
        let rb: Vec<f64> = b.iter().map(|p| p.revenue).collect();
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_quarterly_aggregates_months() {
        let today = date("2025-05-10");
        let quarters = generate_periods(Granularity::Quarterly, today, 4);
        assert_eq!(quarters.len(), 4);
        let labels: Vec<&str> = quarters.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Q3 2024", "Q4 2024", "Q1 2025", "Q2 2025"]);
        assert_eq!(quarters[0].start, date("2024-07-01"));
        assert_eq!(quarters[0].end, date("2024-09-30"));
        // Quarter to date: April and May only.
        assert_eq!(quarters[3].end, date("2025-05-31"));

        let months = generate_periods(Granularity::Monthly, today, 11);
        let q3_revenue: f64 = months[..3].iter().map(|p| p.revenue).sum();
        assert!((quarters[0].revenue - q3_revenue).abs() < 0.05);
        assert_eq!(quarters[3].granularity, Granularity::Quarterly);
    }

    #[test]
    fn test_yearly_labels() {
        let years = generate_periods(Granularity::Yearly, date("2025-03-20"), 3);
        let labels: Vec<&str> = years.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2023", "2024", "2025"]);
        assert_eq!(years[0].start, date("2023-01-01"));
        assert_eq!(years[0].end, date("2023-12-31"));
        assert_eq!(years[2].end, date("2025-03-31"));
    }

    #[test]
    fn test_zero_count() {
        assert!(generate_periods(Granularity::Monthly, date("2025-06-15"), 0).is_empty());
    }

    #[test]
    fn test_huge_count_is_capped() {
        let today = date("2025-06-15");
        let years = generate_periods(Granularity::Yearly, today, 200_000_000);
        assert_eq!(years.len(), MAX_PERIODS);
        assert_eq!(years.last().unwrap().label, "2025");

        let quarters = generate_periods(Granularity::Quarterly, today, 1_000_000_000);
        assert_eq!(quarters.len(), MAX_PERIODS);
        assert_eq!(quarters.last().unwrap().label, "Q2 2025");

        let months = generate_periods(Granularity::Monthly, today, usize::MAX);
        assert_eq!(months.len(), MAX_PERIODS);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2025, 2), 28);
        assert_eq!(last_day_of_month(2025, 12), 31);
    }

    #[test]
    fn test_period_to_date() {
        let today = date("2025-06-15");
        let months = generate_periods(Granularity::Monthly, today, 2);
        let cmp = period_to_date(&months, today).unwrap();
        assert_eq!(cmp.current_label, "Jun 2025");
        assert_eq!(cmp.previous_label, "May 2025");
        assert_eq!(cmp.elapsed_days, 15);
        assert!((cmp.revenue - months[1].revenue * 0.5).abs() < 0.01);
        // 15/30 of May is 15.5 days, rounded to 16 of 31
        assert!((cmp.previous_revenue - months[0].revenue * 16.0 / 31.0).abs() < 0.01);
        assert!(cmp.revenue_change_pct().is_some());
    }

    #[test]
    fn test_period_to_date_needs_two_months() {
        let today = date("2025-06-15");
        let months = generate_periods(Granularity::Monthly, today, 1);
        assert!(period_to_date(&months, today).is_none());
        let months = generate_periods(Granularity::Monthly, today, 3);
        assert!(period_to_date(&months, date("2025-07-01")).is_none());
    }
}

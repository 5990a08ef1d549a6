/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0 && val.abs() >= 0.005;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    if negative {
        format!("-${}.{dec_part}", group_thousands(int_part))
    } else {
        format!("${}.{dec_part}", group_thousands(int_part))
    }
}

fn group_thousands(digits: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a dollar amount as compact "$Xk" or "$X.Xk" for thousands, "$XM" for millions.
pub fn format_k(val: f64) -> String {
    let sign = if val < 0.0 { "-" } else { "" };
    let val = val.abs();
    if val >= 1_000_000.0 {
        let m = val / 1_000_000.0;
        if m == m.floor() {
            format!("{sign}${}M", m as u64)
        } else {
            format!("{sign}${:.1}M", m)
        }
    } else if val >= 1000.0 {
        let k = val / 1000.0;
        if k == k.floor() {
            format!("{sign}${}k", k as u64)
        } else {
            format!("{sign}${:.1}k", k)
        }
    } else {
        format!("{sign}${}", val as u64)
    }
}

/// Pick nice round y-axis tick values (top and mid) given a max data value.
pub fn y_axis_ticks(max_val: f64) -> (f64, f64) {
    // Round steps: 1k, 2.5k, 5k, 10k, 25k, 50k, 100k, 250k, ...
    let steps = [
        1000.0, 2500.0, 5000.0, 10000.0, 25000.0, 50000.0, 100000.0, 250000.0, 500000.0,
        1000000.0, 2500000.0, 5000000.0, 10000000.0,
    ];
    let top = steps
        .iter()
        .copied()
        .find(|&s| s >= max_val)
        .unwrap_or(max_val);
    (top, top / 2.0)
}

/// Signed percentage with one decimal: "+4.2%", "-12.0%".
pub fn percent_change(pct: f64) -> String {
    if pct >= 0.0 {
        format!("+{pct:.1}%")
    } else {
        format!("{pct:.1}%")
    }
}

use std::fmt::Write as _;

use crate::core::{PlanInputs, YearlyRecord, summarize};

const HEADERS: [&str; 6] = [
    "Year",
    "Per Month",
    "Gains",
    "Invested Total",
    "If Not Invested",
    "Tax When Selling",
];

/// Two decimals, `,` grouping, euro sign suffix: `-1,234.50 €`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{amount} €");
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}{}.{:02} €",
        group_thousands(cents / 100),
        cents % 100
    )
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn record_cells(record: &YearlyRecord) -> [String; 6] {
    [
        record.year.to_string(),
        format_currency(record.investment_per_month),
        format_percent(record.gains),
        format_currency(record.with_investment),
        format_currency(record.without_investment),
        format_currency(record.tax),
    ]
}

/// Plain-text report: opening line, aligned yearly table, summary block.
pub fn render_table(inputs: &PlanInputs, records: &[YearlyRecord]) -> String {
    let rows: Vec<[String; 6]> = records.iter().map(record_cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Initial one-time investment: {}",
        format_currency(inputs.start_capital())
    );
    out.push('\n');

    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    if let Some(summary) = summarize(records) {
        out.push('\n');
        let _ = writeln!(
            out,
            "Final Investment Value: {}",
            format_currency(summary.final_value)
        );
        let _ = writeln!(
            out,
            "Total Profit:           {}",
            format_currency(summary.total_profit)
        );
        let _ = writeln!(
            out,
            "Total Tax Liability:    {}",
            format_currency(summary.total_tax)
        );
    }

    out
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(col, (cell, width))| {
            if col == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

//! Display formatting for cell values
//!
//! Formatting never touches the stored value; it only decides how a committed
//! value is shown while the cell is not being edited.

use super::column::ColumnDef;
use super::value::{CellValue, ColumnKind, NumberFormat};

pub const TRUE_LABEL: &str = "✓ True";
pub const FALSE_LABEL: &str = "✗ False";

/// Format the display text for a value in the given column
pub fn display_text(value: &CellValue, column: &ColumnDef) -> String {
    match column.kind {
        ColumnKind::Text => value.as_text(),
        ColumnKind::Number => format_number(value.as_number(), column.format),
        ColumnKind::Boolean => {
            if value.as_bool() { TRUE_LABEL.to_string() } else { FALSE_LABEL.to_string() }
        }
        ColumnKind::Popper => column.trigger_label().to_string(),
    }
}

pub fn format_number(n: f64, format: Option<NumberFormat>) -> String {
    match format {
        Some(NumberFormat::Currency) => format_currency(n, '$'),
        // value is already on a 0-100 scale
        Some(NumberFormat::Percentage) => format!("{:.2}%", n),
        Some(NumberFormat::Decimal) => format!("{:.2}", n),
        None => format_grouped(n, 3),
    }
}

/// Insert thousands separators into a run of ASCII digits
fn group_digits(digits: &str) -> String {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(bytes.len() + bytes.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out
}

/// Format as currency with symbol and thousands separators (e.g., 1234.5 -> $1,234.50)
pub fn format_currency(n: f64, symbol: char) -> String {
    if !n.is_finite() {
        return format!("{}{}", symbol, n);
    }

    let cents = (n.abs() * 100.0).round() as u64;
    let integer_part = cents / 100;
    let decimal_part = cents % 100;
    let with_commas = group_digits(&integer_part.to_string());

    if n < 0.0 && cents > 0 {
        format!("-{}{}.{:02}", symbol, with_commas, decimal_part)
    } else {
        format!("{}{}.{:02}", symbol, with_commas, decimal_part)
    }
}

/// Locale-style grouping with at most `max_fraction` fraction digits and no
/// trailing zeros (e.g., 1234.5678 -> 1,234.568)
pub fn format_grouped(n: f64, max_fraction: usize) -> String {
    if !n.is_finite() {
        return format!("{}", n);
    }

    let fixed = format!("{:.prec$}", n.abs(), prec = max_fraction);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if n < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, group_digits(int_part))
    } else {
        format!("{}{}.{}", sign, group_digits(int_part), frac_part)
    }
}

//! FILENAME: app/dashboard/src/format.rs
//! PURPOSE: Locale-style number and currency formatting for the report.
//! CONTEXT: The summary engine emits plain numbers; turning them into
//! display strings such as `R$ 1.234,56` happens only here.

use serde::{Deserialize, Serialize};

/// How monetary amounts and counts are displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyStyle {
    pub symbol: String,
    pub group_separator: char,
    pub decimal_separator: char,
    pub decimal_places: u8,
}

impl Default for CurrencyStyle {
    /// Brazilian real with Colombian Spanish separators, matching the
    /// dashboard the dataset was published with.
    fn default() -> Self {
        CurrencyStyle {
            symbol: "R$".to_string(),
            group_separator: '.',
            decimal_separator: ',',
            decimal_places: 2,
        }
    }
}

/// Format an amount as currency, e.g. `R$ 1.234,56` or `-R$ 12,00`.
pub fn format_currency(value: f64, style: &CurrencyStyle) -> String {
    let rounded = format!("{:.prec$}", value.abs(), prec = style.decimal_places as usize);
    let digits = add_separators(&rounded, style.group_separator, style.decimal_separator);
    let with_symbol = format!("{} {}", style.symbol, digits);

    if value < 0.0 && digits.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", with_symbol)
    } else {
        with_symbol
    }
}

/// Format a count with group separators, e.g. `12.345`.
pub fn format_count(value: u64, style: &CurrencyStyle) -> String {
    add_separators(&value.to_string(), style.group_separator, style.decimal_separator)
}

/// Insert group separators into the integer part of a plain `1234.56` string
/// and swap in the display decimal separator.
fn add_separators(s: &str, group: char, decimal: char) -> String {
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (s, None),
    };

    let mut result = String::new();
    let len = integer_part.len();
    for (i, c) in integer_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(group);
        }
        result.push(c);
    }

    if let Some(decimals) = decimal_part {
        result.push(decimal);
        result.push_str(decimals);
    }

    result
}

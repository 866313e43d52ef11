//! Money normalization for Latin-American formatted amounts.
//!
//! Invoices print amounts as `$ 1.200.000`, `1.500,75` or `45,50`, and the
//! scanned ones add OCR letter/digit confusions on top. Everything funnels
//! into [`normalize_amount`], which never fails: 0.0 means "not found".

use super::patterns::{AMOUNT_RUN, CURRENCY_TOKEN};
use super::FieldExtractor;

/// Extractor for `$`-prefixed amounts anywhere in a text.
pub struct CurrencyAmountExtractor;

impl CurrencyAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CurrencyAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CurrencyAmountExtractor {
    type Output = f64;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        CURRENCY_TOKEN
            .captures_iter(text)
            .map(|caps| normalize_amount(&caps[1]))
            .filter(|amount| *amount > 0.0)
            .collect()
    }
}

/// Largest currency-prefixed amount in the text, or 0.0.
pub fn largest_currency_amount(text: &str) -> f64 {
    CurrencyAmountExtractor::new()
        .extract_all(text)
        .into_iter()
        .fold(0.0, f64::max)
}

/// Turn a noisy currency-like string into an amount.
pub fn normalize_amount(raw: &str) -> f64 {
    let corrected = correct_ocr_digits(&raw.to_uppercase());

    let Some(run) = longest_run(&corrected) else {
        return 0.0;
    };
    let run = run.trim_end_matches(|c| c == '.' || c == ',');
    let canonical = resolve_separators(run);

    match canonical.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

// Only tokens that already hold a digit are rewritten, so plain words stay words.
fn correct_ocr_digits(s: &str) -> String {
    s.split_whitespace()
        .map(|token| {
            if token.chars().any(|c| c.is_ascii_digit()) {
                token
                    .chars()
                    .map(|c| match c {
                        'S' => '5',
                        'O' => '0',
                        'B' => '8',
                        other => other,
                    })
                    .collect()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn longest_run(s: &str) -> Option<&str> {
    AMOUNT_RUN
        .find_iter(s)
        .map(|m| m.as_str())
        .fold(None, |best, run| match best {
            Some(b) if b.len() >= run.len() => Some(b),
            _ => Some(run),
        })
}

fn resolve_separators(run: &str) -> String {
    match (run.contains('.'), run.contains(',')) {
        // '.' groups thousands and ',' is the decimal mark, whatever the order.
        (true, true) => run.replace('.', "").replace(',', "."),
        (false, true) => resolve_single_separator(run, ','),
        (true, false) => resolve_single_separator(run, '.'),
        (false, false) => run.to_string(),
    }
}

/// A lone separator kind is a thousands mark when the final group has three digits.
fn resolve_single_separator(run: &str, sep: char) -> String {
    match run.rsplit_once(sep) {
        Some((_, tail)) if tail.len() == 3 => run.replace(sep, ""),
        Some((head, tail)) => format!("{}.{}", head.replace(sep, ""), tail),
        None => run.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_dots() {
        assert_eq!(normalize_amount("1.200.000"), 1200000.0);
        assert_eq!(normalize_amount("$ 125.000"), 125000.0);
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(normalize_amount("45,50"), 45.50);
        assert_eq!(normalize_amount("1,200,000"), 1200000.0);
    }

    #[test]
    fn test_mixed_separators() {
        assert_eq!(normalize_amount("1.500,75"), 1500.75);
        assert_eq!(normalize_amount("1,500.75"), 1.50075);
        assert_eq!(normalize_amount("2,345.678"), 2.345678);
    }

    #[test]
    fn test_plain_decimal_point() {
        assert_eq!(normalize_amount("1500.75"), 1500.75);
        assert_eq!(normalize_amount("1200000"), 1200000.0);
    }

    #[test]
    fn test_unparseable_is_zero() {
        assert_eq!(normalize_amount(""), 0.0);
        assert_eq!(normalize_amount("garbage"), 0.0);
        assert_eq!(normalize_amount("$ ..."), 0.0);
    }

    #[test]
    fn test_ocr_confusions() {
        assert_eq!(normalize_amount("$ 1O.5OO"), 10500.0);
        assert_eq!(normalize_amount("$1S0.000"), 150000.0);
        assert_eq!(normalize_amount("B4,50"), 84.50);
    }

    #[test]
    fn test_longest_run_wins() {
        assert_eq!(normalize_amount("Pag 2   TOTAL $ 345.800"), 345800.0);
    }

    #[test]
    fn test_trailing_separator_is_dropped() {
        assert_eq!(normalize_amount("$ 98.000."), 98000.0);
    }

    #[test]
    fn test_leading_separator_is_decimal() {
        assert_eq!(normalize_amount(",50"), 0.5);
        assert_eq!(normalize_amount(".5"), 0.5);
        assert_eq!(normalize_amount("$ ,75"), 0.75);
    }

    #[test]
    fn test_idempotent_on_formatted_output() {
        for raw in ["1.200.000", "45,50", "1.500,75", "$ 125.000", "0,99"] {
            let first = normalize_amount(raw);
            assert_eq!(normalize_amount(&first.to_string()), first, "input {raw}");
        }
    }

    #[test]
    fn test_largest_currency_amount() {
        let text = "CONSUMO $ 12.500\nAJUSTE $ 300\nTOTAL $ 45.8OO\nPAG 1";
        assert_eq!(largest_currency_amount(text), 45800.0);
        assert_eq!(largest_currency_amount("sin valores"), 0.0);
    }

    #[test]
    fn test_extract_all_currency_amounts() {
        let amounts = CurrencyAmountExtractor::new().extract_all("$ 1.000 y $2.500,50");
        assert_eq!(amounts, vec![1000.0, 2500.5]);
    }
}

//! Date normalization for Spanish-language invoices.

use chrono::NaiveDate;

use super::lookup::fold;
use super::patterns::{DATE_DAY_MONTH_NAME, DATE_MONTH_NAME_YEAR, DATE_NUMERIC, MONTH_YEAR_TOKEN};
use super::FieldExtractor;
use crate::models::record::DateValue;

/// Extractor for retro-era `MMM-YYYY` period tokens.
pub struct MonthYearExtractor;

impl MonthYearExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MonthYearExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MonthYearExtractor {
    type Output = NaiveDate;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        MONTH_YEAR_TOKEN
            .captures_iter(text)
            .filter_map(|caps| {
                let month = month_number(&caps[1])?;
                let year: i32 = caps[2].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, 1)
            })
            .collect()
    }
}

/// Normalize a free-text date fragment.
///
/// Patterns are tried in order: day-monthname-year, numeric day/month/year,
/// then monthname-year (day 01). Text that matches none of them is returned
/// trimmed as [`DateValue::Raw`].
pub fn normalize_date(raw: &str) -> DateValue {
    let trimmed = raw.trim();

    day_month_name_year(trimmed)
        .or_else(|| numeric_day_month_year(trimmed))
        .or_else(|| month_name_year(trimmed))
        .map(DateValue::Date)
        .unwrap_or_else(|| DateValue::Raw(trimmed.to_string()))
}

/// Normalize a date candidate, treating blank input as absent.
pub fn normalize_date_opt(raw: Option<String>) -> Option<DateValue> {
    raw.filter(|s| !s.trim().is_empty()).map(|s| normalize_date(&s))
}

fn day_month_name_year(text: &str) -> Option<NaiveDate> {
    DATE_DAY_MONTH_NAME.captures_iter(text).find_map(|caps| {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = expand_year(&caps[3])?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn numeric_day_month_year(text: &str) -> Option<NaiveDate> {
    DATE_NUMERIC.captures_iter(text).find_map(|caps| {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn month_name_year(text: &str) -> Option<NaiveDate> {
    DATE_MONTH_NAME_YEAR.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[1])?;
        let year: i32 = caps[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)
    })
}

fn expand_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 {
        Some(2000 + year)
    } else {
        Some(year)
    }
}

/// Map a Spanish month name or abbreviation to its number.
pub fn month_number(word: &str) -> Option<u32> {
    let month = match fold(word.trim_end_matches('.')).as_str() {
        "ENE" | "ENERO" => 1,
        "FEB" | "FEBRERO" => 2,
        "MAR" | "MARZO" => 3,
        "ABR" | "ABRIL" => 4,
        "MAY" | "MAYO" => 5,
        "JUN" | "JUNIO" => 6,
        "JUL" | "JULIO" => 7,
        "AGO" | "AGOSTO" => 8,
        "SEP" | "SET" | "SEPT" | "SEPTIEMBRE" | "SETIEMBRE" => 9,
        "OCT" | "OCTUBRE" => 10,
        "NOV" | "NOVIEMBRE" => 11,
        "DIC" | "DICIEMBRE" => 12,
        _ => return None,
    };
    Some(month)
}

//! Rule-based field extractors for utility invoices.

pub mod dates;
pub mod lookup;
pub mod money;
pub mod patterns;

pub use dates::{month_number, normalize_date, normalize_date_opt, MonthYearExtractor};
pub use lookup::{
    below_label, clean_identifier, contains_label, digits_only, find_label, first_column, fold,
    horizontal_amount, next_line, same_line, same_line_amount, table_cell,
};
pub use money::{largest_currency_amount, normalize_amount, CurrencyAmountExtractor};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// First occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

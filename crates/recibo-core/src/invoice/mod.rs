//! Invoice field extraction module.

mod classifier;
pub mod diagnostics;
mod parser;
pub mod rules;
pub mod strategies;

pub use classifier::{classify, LayoutClassifier};
pub use diagnostics::{diagnose, Diagnosis, KeywordHit};
pub use parser::{ExtractionResult, InvoiceParser};
pub use strategies::{strategy_for, DocumentText, ModelStrategy};

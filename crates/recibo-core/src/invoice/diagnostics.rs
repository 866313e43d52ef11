//! Structural X-ray of a document's text.
//!
//! Used to inspect a new template before writing rules for it: whether the
//! PDF carries text at all, what the first lines look like, and on which
//! lines the usual anchor keywords sit.

use serde::Serialize;

use super::classifier::LayoutClassifier;
use super::rules::contains_label;
use crate::models::record::LayoutModel;

/// Keywords whose line positions are reported.
pub static ANCHOR_KEYWORDS: [&str; 7] = [
    "TOTAL", "PAGAR", "FACTURA", "POLIZA", "FECHA", "PERIODO", "CUFE",
];

/// Number of leading lines kept as a preview.
pub const PREVIEW_LINES: usize = 20;

/// One keyword occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordHit {
    /// 1-based line number.
    pub line: usize,
    pub keyword: &'static str,
    /// Whether the line also carries a digit, i.e. likely holds its value.
    pub has_digits: bool,
    pub text: String,
}

/// Diagnostic summary of one document.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    /// Character count of the trimmed text.
    pub char_count: usize,
    /// Too little text to extract from; needs OCR.
    pub is_scanned: bool,
    /// First non-empty lines.
    pub preview: Vec<String>,
    pub hits: Vec<KeywordHit>,
    pub model: LayoutModel,
}

impl Diagnosis {
    /// Hits for one keyword.
    pub fn hits_for(&self, keyword: &str) -> impl Iterator<Item = &KeywordHit> {
        self.hits.iter().filter(move |h| h.keyword == keyword)
    }
}

/// Template era a layout model belongs to.
pub fn era(model: LayoutModel) -> &'static str {
    match model {
        LayoutModel::Electronic => "2024-2025",
        LayoutModel::Transitional => "2023",
        LayoutModel::Legacy => "2017-2020",
        LayoutModel::Retro => "2001",
        LayoutModel::AccountStatement => "statement",
    }
}

/// Diagnose text with the given classifier and scan threshold.
pub fn diagnose_with(text: &str, classifier: &LayoutClassifier, min_text_length: usize) -> Diagnosis {
    let char_count = text.trim().chars().count();

    let preview = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(PREVIEW_LINES)
        .map(str::to_string)
        .collect();

    let hits = text
        .lines()
        .enumerate()
        .flat_map(|(i, line)| {
            ANCHOR_KEYWORDS
                .iter()
                .filter(move |kw| contains_label(line, kw))
                .map(move |kw| KeywordHit {
                    line: i + 1,
                    keyword: *kw,
                    has_digits: line.chars().any(|c| c.is_ascii_digit()),
                    text: line.trim().to_string(),
                })
        })
        .collect();

    Diagnosis {
        char_count,
        is_scanned: char_count < min_text_length,
        preview,
        hits,
        model: classifier.classify(text),
    }
}

/// Diagnose text with default markers and a 50-character scan threshold.
pub fn diagnose(text: &str) -> Diagnosis {
    diagnose_with(text, &LayoutClassifier::new(), 50)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_scanned() {
        let diagnosis = diagnose("  \n  PAG 1 \n");
        assert!(diagnosis.is_scanned);
        assert_eq!(diagnosis.char_count, 5);
        assert_eq!(diagnosis.preview, vec!["PAG 1".to_string()]);
    }

    #[test]
    fn test_keyword_hits() {
        let text = "\
FACTURA ELECTRONICA DE VENTA No. FE 1001
Cliente sin datos numericos en esta linea larga de prueba
TOTAL A PAGAR
$ 125.000
CUFE: 3b1f0c9e77aa";
        let diagnosis = diagnose(text);

        assert!(!diagnosis.is_scanned);
        assert_eq!(diagnosis.model, LayoutModel::Electronic);

        let total: Vec<_> = diagnosis.hits_for("TOTAL").collect();
        assert_eq!(total.len(), 1);
        assert_eq!(total[0].line, 3);
        assert!(!total[0].has_digits);

        let factura: Vec<_> = diagnosis.hits_for("FACTURA").collect();
        assert_eq!(factura[0].line, 1);
        assert!(factura[0].has_digits);

        assert_eq!(diagnosis.hits_for("CUFE").count(), 1);
        assert_eq!(diagnosis.hits_for("POLIZA").count(), 0);
    }

    #[test]
    fn test_era_labels() {
        assert_eq!(era(LayoutModel::Legacy), "2017-2020");
        assert_eq!(era(LayoutModel::Retro), "2001");
    }
}

//! Layout model classification from telltale substrings.

use regex::Regex;
use tracing::debug;

use super::rules::{contains_label, fold, MONTH_YEAR_TOKEN};
use crate::models::config::ClassifierMarkers;
use crate::models::record::LayoutModel;

/// Assigns exactly one layout model to a document's text.
///
/// Rules are checked in priority order: account statement, electronic,
/// transitional, retro, and legacy as the fallback.
pub struct LayoutClassifier {
    markers: ClassifierMarkers,
    auth_code_tags: Vec<Regex>,
}

impl LayoutClassifier {
    /// Create a classifier with the default markers.
    pub fn new() -> Self {
        Self::with_markers(ClassifierMarkers::default())
    }

    /// Create a classifier with custom markers.
    pub fn with_markers(markers: ClassifierMarkers) -> Self {
        let auth_code_tags = markers
            .auth_code_tags
            .iter()
            .filter(|tag| !tag.trim().is_empty())
            .filter_map(|tag| {
                Regex::new(&format!(r"\b{}\s*:", regex::escape(&fold(tag.trim())))).ok()
            })
            .collect();

        Self {
            markers,
            auth_code_tags,
        }
    }

    /// Classify a document's full text.
    pub fn classify(&self, text: &str) -> LayoutModel {
        let folded = fold(text);
        let any = |labels: &[String]| labels.iter().any(|l| contains_label(&folded, l));

        let model = if any(&self.markers.statement) {
            LayoutModel::AccountStatement
        } else if self.auth_code_tags.iter().any(|re| re.is_match(&folded))
            || any(&self.markers.electronic)
        {
            LayoutModel::Electronic
        } else if any(&self.markers.transitional_brands)
            || (contains_label(&folded, &self.markers.period)
                && contains_label(&folded, &self.markers.period_total))
        {
            LayoutModel::Transitional
        } else if MONTH_YEAR_TOKEN.is_match(&folded) {
            LayoutModel::Retro
        } else {
            LayoutModel::Legacy
        };

        debug!("Classified document as {}", model);
        model
    }
}

impl Default for LayoutClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify text with the given markers.
pub fn classify(text: &str, markers: &ClassifierMarkers) -> LayoutModel {
    LayoutClassifier::with_markers(markers.clone()).classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_default(text: &str) -> LayoutModel {
        classify(text, &ClassifierMarkers::default())
    }

    #[test]
    fn test_auth_code_beats_retro_token() {
        let text = "CUFE: 9f3a77c1e0\nPERIODO OCT-2001\nTOTAL FACTURA A PAGAR $ 125.000";
        assert_eq!(classify_default(text), LayoutModel::Electronic);
    }

    #[test]
    fn test_no_markers_is_legacy() {
        assert_eq!(
            classify_default("FACTURA DE SERVICIOS No.\nTotal a Pagar .... $ 450.000"),
            LayoutModel::Legacy
        );
        assert_eq!(classify_default(""), LayoutModel::Legacy);
    }

    #[test]
    fn test_statement_has_highest_priority() {
        let text = "ESTADO DE CUENTA\nFactura Electrónica de Venta\nCUFE: abc";
        assert_eq!(classify_default(text), LayoutModel::AccountStatement);
    }

    #[test]
    fn test_electronic_phrase_with_accents() {
        assert_eq!(
            classify_default("Factura Electrónica de Venta No. FE 1234"),
            LayoutModel::Electronic
        );
    }

    #[test]
    fn test_cufe_without_colon_is_not_a_tag() {
        assert_eq!(
            classify_default("consulte el CUFE en nuestra pagina"),
            LayoutModel::Legacy
        );
    }

    #[test]
    fn test_transitional_markers() {
        let text = "PERIODO FACTURADO: ABRIL 2023\nTOTAL FACTURA SERVICIOS DEL PERIODO $ 80.000";
        assert_eq!(classify_default(text), LayoutModel::Transitional);
        assert_eq!(
            classify_default("Descarga nuestra App y paga en linea"),
            LayoutModel::Transitional
        );
    }

    #[test]
    fn test_retro_month_year_token() {
        assert_eq!(
            classify_default("REF 884512  PERIODO SEP-2001"),
            LayoutModel::Retro
        );
    }

    #[test]
    fn test_custom_brand_marker() {
        let markers = ClassifierMarkers {
            transitional_brands: vec!["MI ACUEDUCTO APP".to_string()],
            ..ClassifierMarkers::default()
        };
        let classifier = LayoutClassifier::with_markers(markers);
        assert_eq!(
            classifier.classify("Pague con Mi Acueducto App"),
            LayoutModel::Transitional
        );
    }
}

//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::ReciboError;
use crate::pdf::TextMode;
use crate::report::Column;

/// Main configuration for the recibo pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReciboConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Layout classification markers.
    pub classifier: ClassifierMarkers,

    /// Language-model reader configuration.
    pub reader: ReaderConfig,

    /// Report layout.
    pub report: ReportConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Text extraction mode handed to the PDF collaborator.
    pub text_mode: TextMode,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// Minimum text length to consider a PDF as text-based.
    pub min_text_length: usize,

    /// Reconstruct whitespace-column tables from page text.
    pub extract_tables: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            text_mode: TextMode::Layout,
            max_pages: 0,
            min_text_length: 50,
            extract_tables: true,
        }
    }
}

/// How LEGACY invoices fill the monthly service amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyMonthlyPolicy {
    /// Monthly amount equals the total to pay.
    #[default]
    SameAsTotal,
    /// Monthly amount is the current-period services line only.
    CurrentPeriod,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Monthly amount policy for LEGACY invoices.
    pub legacy_monthly: LegacyMonthlyPolicy,

    /// Smallest value accepted by the LEGACY horizontal amount scan.
    pub legacy_min_amount: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            legacy_monthly: LegacyMonthlyPolicy::SameAsTotal,
            legacy_min_amount: 100.0,
        }
    }
}

/// Marker phrases used by the layout classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierMarkers {
    /// Phrases that identify an account statement.
    pub statement: Vec<String>,

    /// Authentication-code tags; a tag followed by ':' marks an electronic invoice.
    pub auth_code_tags: Vec<String>,

    /// Explicit electronic invoice phrases.
    pub electronic: Vec<String>,

    /// 2023-era app-brand tokens.
    pub transitional_brands: Vec<String>,

    /// Period marker for the transitional layout.
    pub period: String,

    /// Per-period total heading for the transitional layout.
    pub period_total: String,
}

impl Default for ClassifierMarkers {
    fn default() -> Self {
        Self {
            statement: vec!["ESTADO DE CUENTA".to_string()],
            auth_code_tags: vec!["CUFE".to_string()],
            electronic: vec!["FACTURA ELECTRONICA".to_string()],
            transitional_brands: vec!["DESCARGA NUESTRA APP".to_string()],
            period: "PERIODO".to_string(),
            period_total: "TOTAL FACTURA SERVICIOS DEL PERIODO".to_string(),
        }
    }
}

/// Language-model reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// API key passed to the reader client at call time.
    pub api_key: Option<String>,

    /// Models to try in order; at most two.
    pub models: Vec<String>,

    /// Minimum delay between successive calls, in milliseconds.
    pub min_delay_ms: u64,

    /// Base URL of the model-serving API.
    pub endpoint: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            models: vec!["gemini-2.0-flash".to_string(), "gemini-1.5-flash".to_string()],
            min_delay_ms: 3000,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Report layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Column order of the assembled report.
    pub columns: Vec<Column>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            columns: Column::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl ReciboConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        if self.reader.models.len() > 2 {
            return Err(ReciboError::Config(format!(
                "reader.models lists {} models; at most two attempts are allowed",
                self.reader.models.len()
            )));
        }
        if self.report.columns.is_empty() {
            return Err(ReciboError::Config("report.columns is empty".to_string()));
        }
        if self.extraction.legacy_min_amount < 0.0 {
            return Err(ReciboError::Config(
                "extraction.legacy_min_amount must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ReciboConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_three_reader_models() {
        let mut config = ReciboConfig::default();
        config.reader.models.push("third".to_string());
        assert!(matches!(config.validate(), Err(ReciboError::Config(_))));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ReciboConfig =
            serde_json::from_str(r#"{"extraction": {"legacy_monthly": "current_period"}}"#)
                .unwrap();
        assert_eq!(config.extraction.legacy_monthly, LegacyMonthlyPolicy::CurrentPeriod);
        assert_eq!(config.extraction.legacy_min_amount, 100.0);
        assert_eq!(config.reader.min_delay_ms, 3000);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ReciboConfig::default();
        config.reader.api_key = Some("k".to_string());
        config.save(&path).unwrap();

        let loaded = ReciboConfig::from_file(&path).unwrap();
        assert_eq!(loaded.reader.api_key.as_deref(), Some("k"));
    }
}

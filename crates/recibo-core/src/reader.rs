//! Language-model reader path.
//!
//! Instead of heuristics, the raw PDF goes to a hosted model together with
//! an instruction asking for a JSON object. The reply is free text: code
//! fences are stripped, the first `{...}` object is parsed, and the values
//! run through the same normalizers as the heuristic path. Models are tried
//! in order, at most two of them.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::ReaderError;
use crate::invoice::rules::{digits_only, normalize_amount, normalize_date_opt};
use crate::models::record::InvoiceRecord;

/// Maximum number of models tried per document.
pub const MAX_ATTEMPTS: usize = 2;

/// Instruction sent with every document.
pub const READER_INSTRUCTION: &str = "\
You are reading a Colombian utility invoice in Spanish. Return ONLY one JSON \
object, with no commentary, using exactly these keys:
{
  \"invoice_number\": string or null,
  \"billing_period\": string or null (the billed month, e.g. \"ABRIL 2023\"),
  \"due_date\": string or null (the 'PAGUE HASTA' date),
  \"customer_name\": string or null,
  \"policy_number\": string or null (digits after 'POLIZA'),
  \"monthly_amount\": number or string (services of the current period),
  \"total_due\": number or string (total to pay),
  \"lighting_tax\": number or string (public lighting tax, 0 if absent),
  \"late_interest\": number or string (late-payment interest, 0 if absent)
}
Copy amounts and dates exactly as printed.";

/// A model-serving backend that reads a document.
#[async_trait]
pub trait InvoiceReader: Send + Sync {
    /// Send the document and instruction to `model`, returning the reply text.
    async fn read(
        &self,
        model: &str,
        document: &[u8],
        instruction: &str,
    ) -> Result<String, ReaderError>;
}

/// An amount as the model returned it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReaderAmount {
    Number(f64),
    Text(String),
}

impl ReaderAmount {
    fn value(&self) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() && *n >= 0.0 => *n,
            Self::Number(_) => 0.0,
            Self::Text(s) => normalize_amount(s),
        }
    }
}

/// Fields requested from the model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReaderFields {
    pub invoice_number: Option<String>,
    pub billing_period: Option<String>,
    pub due_date: Option<String>,
    pub customer_name: Option<String>,
    pub policy_number: Option<String>,
    pub monthly_amount: Option<ReaderAmount>,
    pub total_due: Option<ReaderAmount>,
    pub lighting_tax: Option<ReaderAmount>,
    pub late_interest: Option<ReaderAmount>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn amount(value: Option<&ReaderAmount>) -> f64 {
    value.map(ReaderAmount::value).unwrap_or(0.0)
}

impl ReaderFields {
    /// Normalize into a record. Reader rows carry no layout model.
    pub fn into_record(self, filename: &str) -> InvoiceRecord {
        let mut record = InvoiceRecord::new(filename);
        record.invoice_number = non_empty(self.invoice_number);
        record.billing_period = normalize_date_opt(self.billing_period);
        record.due_date = normalize_date_opt(self.due_date);
        record.customer_name = non_empty(self.customer_name);
        record.policy_number = self.policy_number.as_deref().and_then(digits_only);
        record.monthly_amount = amount(self.monthly_amount.as_ref());
        record.total_due = amount(self.total_due.as_ref());
        record.lighting_tax = amount(self.lighting_tax.as_ref());
        record.late_interest = amount(self.late_interest.as_ref());
        record
    }
}

/// Remove surrounding markdown code fences, with or without a language tag.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Slice from the first `{` to its matching `}`, ignoring braces in strings.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a model reply into fields.
pub fn parse_reader_response(reply: &str) -> Result<ReaderFields, ReaderError> {
    let body = strip_code_fence(reply);
    let object = first_json_object(body)
        .ok_or_else(|| ReaderError::MalformedResponse("no JSON object in reply".to_string()))?;
    Ok(serde_json::from_str(object)?)
}

/// Read one document, trying each model in order until one succeeds.
///
/// Never fails: when every attempt fails, the record carries the last error
/// in `customer_name` and zero amounts.
pub async fn read_with_fallback<R: InvoiceReader + ?Sized>(
    reader: &R,
    models: &[String],
    document: &[u8],
    filename: &str,
) -> InvoiceRecord {
    let mut last_error = ReaderError::NoModels;

    for model in models.iter().take(MAX_ATTEMPTS) {
        debug!("Reading {} with {}", filename, model);

        let attempt = reader
            .read(model, document, READER_INSTRUCTION)
            .await
            .and_then(|reply| parse_reader_response(&reply));

        match attempt {
            Ok(fields) => {
                info!("Read {} with {}", filename, model);
                return fields.into_record(filename);
            }
            Err(e) => {
                warn!("Model {} failed on {}: {}", model, filename, e);
                last_error = e;
            }
        }
    }

    let mut record = InvoiceRecord::new(filename);
    record.customer_name = Some(format!("ERROR: {}", last_error));
    record
}

/// Minimum-interval pacing between successive reader calls.
#[derive(Debug, Clone)]
pub struct Pacer {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Pacer from a millisecond interval.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// How long to wait at `now` before the next call may start.
    pub fn wait_time(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Record that a call started at `now`.
    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct ScriptedReader {
        replies: Mutex<Vec<Result<String, ReaderError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedReader {
        fn new(replies: Vec<Result<String, ReaderError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InvoiceReader for ScriptedReader {
        async fn read(
            &self,
            model: &str,
            _document: &[u8],
            _instruction: &str,
        ) -> Result<String, ReaderError> {
            self.calls.lock().unwrap().push(model.to_string());
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn models() -> Vec<String> {
        vec!["primary".to_string(), "fallback".to_string(), "third".to_string()]
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_reply_with_prose() {
        let reply = "Aqui esta:\n```json\n{\"invoice_number\": \"FE 77\", \"total_due\": \"$ 125.000\", \"customer_name\": \"A {B}\"}\n```";
        let fields = parse_reader_response(reply).unwrap();
        let record = fields.into_record("a.pdf");

        assert_eq!(record.invoice_number.as_deref(), Some("FE 77"));
        assert_eq!(record.customer_name.as_deref(), Some("A {B}"));
        assert_eq!(record.total_due, 125000.0);
        assert_eq!(record.model, None);
    }

    #[test]
    fn test_numeric_amounts_and_dates() {
        let reply = r#"{"monthly_amount": 80450, "due_date": "15/05/2023", "policy_number": "12-345"}"#;
        let record = parse_reader_response(reply).unwrap().into_record("a.pdf");

        assert_eq!(record.monthly_amount, 80450.0);
        assert_eq!(record.due_date.unwrap().to_string(), "2023-05-15");
        assert_eq!(record.policy_number.as_deref(), Some("12345"));
    }

    #[test]
    fn test_malformed_reply() {
        assert!(matches!(
            parse_reader_response("no puedo leer el documento"),
            Err(ReaderError::MalformedResponse(_))
        ));
        assert!(parse_reader_response("{\"total_due\": }").is_err());
    }

    #[tokio::test]
    async fn test_fallback_after_malformed_reply() {
        let reader = ScriptedReader::new(vec![
            Ok("lo siento".to_string()),
            Ok(r#"{"total_due": "450.000"}"#.to_string()),
        ]);
        let record = read_with_fallback(&reader, &models(), b"%PDF", "a.pdf").await;

        assert_eq!(reader.calls(), vec!["primary", "fallback"]);
        assert_eq!(record.total_due, 450000.0);
    }

    #[tokio::test]
    async fn test_gives_up_after_two_attempts() {
        let reader = ScriptedReader::new(vec![
            Err(ReaderError::Api {
                model: "primary".to_string(),
                message: "HTTP 429".to_string(),
            }),
            Err(ReaderError::Api {
                model: "fallback".to_string(),
                message: "HTTP 503".to_string(),
            }),
            Ok("{}".to_string()),
        ]);
        let record = read_with_fallback(&reader, &models(), b"%PDF", "a.pdf").await;

        assert_eq!(reader.calls().len(), 2);
        assert_eq!(
            record.customer_name.as_deref(),
            Some("ERROR: API call to fallback failed: HTTP 503")
        );
        assert_eq!(record.total_due, 0.0);
        assert_eq!(record.monthly_amount, 0.0);
    }

    #[tokio::test]
    async fn test_no_models() {
        let reader = ScriptedReader::new(vec![]);
        let record = read_with_fallback(&reader, &[], b"%PDF", "a.pdf").await;
        assert_eq!(
            record.customer_name.as_deref(),
            Some("ERROR: no reader models configured")
        );
    }

    #[test]
    fn test_pacer() {
        let start = Instant::now();
        let mut pacer = Pacer::from_millis(3000);

        assert_eq!(pacer.wait_time(start), Duration::ZERO);
        pacer.mark(start);
        assert_eq!(
            pacer.wait_time(start + Duration::from_millis(1000)),
            Duration::from_millis(2000)
        );
        assert_eq!(pacer.wait_time(start + Duration::from_secs(5)), Duration::ZERO);
    }
}

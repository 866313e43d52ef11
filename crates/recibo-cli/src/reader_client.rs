//! Gemini `generateContent` client for the reader path.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

use recibo_core::error::ReaderError;
use recibo_core::models::config::ReaderConfig;
use recibo_core::reader::InvoiceReader;

/// Sends the PDF inline with the instruction and returns the first text part.
pub struct GeminiReader {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiReader {
    /// Build a client. The key comes from configuration, never from the binary.
    pub fn new(api_key: String, config: &ReaderConfig) -> Result<Self, ReaderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReaderError::Api {
                model: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            api_key,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Client from configuration, with `GEMINI_API_KEY` as a fallback key source.
    pub fn from_config(config: &ReaderConfig) -> Result<Self, ReaderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or(ReaderError::MissingApiKey)?;
        Self::new(api_key, config)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Part<'a> {
    InlineData { mime_type: &'a str, data: String },
    Text(&'a str),
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    text: Option<String>,
}

/// API error response.
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl InvoiceReader for GeminiReader {
    async fn read(
        &self,
        model: &str,
        document: &[u8],
        instruction: &str,
    ) -> Result<String, ReaderError> {
        let api_error = |message: String| ReaderError::Api {
            model: model.to_string(),
            message,
        };

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        mime_type: "application/pdf",
                        data: STANDARD.encode(document),
                    },
                    Part::Text(instruction),
                ],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.endpoint, model);
        debug!("POST {} ({} bytes)", url, document.len());

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| api_error(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| api_error(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|err| err.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}: {body}"));
            return Err(api_error(message));
        }

        let response: GenerateResponse = serde_json::from_str(&body)?;
        response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| ReaderError::MalformedResponse("no text in response".to_string()))
    }
}

//! Gemini inference adapter
//!
//! Implements [`InferenceProvider`] over the `generateContent` REST endpoint.
//! Audio is sent inline as base64. Failures are mapped onto the transient /
//! non-transient split of [`DomainError`] so the gateway can decide on retries.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use callsight::{DomainError, InferenceProvider, InferenceRequest, InferenceResponse, TokenUsage};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Keeps the key out of the URL, which reqwest echoes into its errors.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client. Timeouts are enforced by the gateway, not here.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new provider using the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the Gemini model name if needed.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl InferenceProvider for GeminiProvider {
    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceResponse, DomainError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::from_request(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| DomainError::ExternalService(format!("Gemini parse error: {}", err)))?;

        let text = extract_text(&payload).ok_or_else(|| {
            DomainError::ExternalService("Gemini returned no candidate text".to_string())
        })?;

        Ok(InferenceResponse {
            text,
            usage: extract_usage(&payload),
        })
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ============================================
// Request Types
// ============================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateContentRequest {
    fn from_request(request: &InferenceRequest) -> Self {
        let mut parts = vec![Part::Text(request.instructions.clone())];

        if let Some(audio) = &request.audio {
            parts.push(Part::InlineData(InlineData {
                mime_type: audio.mime_type.clone(),
                data: STANDARD.encode(&audio.bytes),
            }));
        }
        if let Some(context) = &request.context_text {
            parts.push(Part::Text(context.clone()));
        }

        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        }
    }
}

// ============================================
// Helper Functions
// ============================================

fn extract_text(root: &Value) -> Option<String> {
    let candidates = root.get("candidates")?.as_array()?;

    let collected: Vec<&str> = candidates
        .iter()
        .take(1)
        .filter_map(|candidate| candidate.get("content")?.get("parts")?.as_array())
        .flatten()
        .filter_map(|part| part.get("text")?.as_str())
        .collect();

    if collected.is_empty() {
        None
    } else {
        Some(collected.concat())
    }
}

fn extract_usage(root: &Value) -> TokenUsage {
    let count = |key: &str| {
        root.get("usageMetadata")
            .and_then(|meta| meta.get(key))
            .and_then(Value::as_u64)
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(0)
    };
    TokenUsage::new(count("promptTokenCount"), count("candidatesTokenCount"))
}

fn map_transport_error(err: reqwest::Error) -> DomainError {
    let err = err.without_url();
    if err.is_timeout() {
        DomainError::Timeout(format!("Gemini request timed out: {}", err))
    } else if err.is_builder() {
        DomainError::Validation(format!("Gemini request invalid: {}", err))
    } else {
        DomainError::Unavailable(format!("Gemini request failed: {}", err))
    }
}

fn map_http_error(status: StatusCode, body: String) -> DomainError {
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or(body);

    let detail = format!("Gemini API error ({}): {}", status.as_u16(), message);
    if status == StatusCode::TOO_MANY_REQUESTS {
        DomainError::RateLimited(detail)
    } else if status == StatusCode::REQUEST_TIMEOUT || status.is_server_error() {
        DomainError::Unavailable(detail)
    } else {
        DomainError::Validation(detail)
    }
}

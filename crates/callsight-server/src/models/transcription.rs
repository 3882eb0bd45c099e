//! Transcription - Aggregate pipeline result as returned over HTTP

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use callsight::TokenUsage;

use crate::application::{PersistenceStatus, TokenReport, TranscriptionResult};

/// Token counts for one stage
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenUsageResponse {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

/// Token counts per stage; `total` is `stage1 + stage2`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenReportResponse {
    pub stage1: TokenUsageResponse,
    pub stage2: TokenUsageResponse,
    pub total: TokenUsageResponse,
    /// Spent generating a prompt for a newly discovered pair, not in `total`
    pub prompt_generation: TokenUsageResponse,
    /// Spent on the tonal analysis, not in `total`
    pub tonal_analysis: TokenUsageResponse,
}

/// What was stored for this call
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersistenceResponse {
    /// Present when the call record was stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<i64>,
    pub domain_specific_saved: bool,
    pub tonal_analysis_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Transcription result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranscriptionResponse {
    pub file_name: String,
    pub transcript: String,
    pub domain: String,
    pub category: String,
    /// cached, generated or fallback
    pub prompt_source: String,
    /// Extracted fields; `{}` when extraction degraded
    pub domain_specific_data: serde_json::Value,
    /// Six-section general analysis; `{}` when extraction degraded
    pub general_metrics: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
    /// Tone and sentiment of the audio; `{}` when the tonal pass degraded
    pub tonal_analysis: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tonal_error: Option<String>,
    pub persistence: PersistenceResponse,
    pub token_usage: TokenReportResponse,
}

/// Error body for failed requests
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
        }
    }
}

impl From<TokenUsage> for TokenUsageResponse {
    fn from(usage: TokenUsage) -> Self {
        Self {
            input: usage.input_tokens,
            output: usage.output_tokens,
            total: usage.total(),
        }
    }
}

impl From<TokenReport> for TokenReportResponse {
    fn from(report: TokenReport) -> Self {
        Self {
            stage1: report.stage1.into(),
            stage2: report.stage2.into(),
            total: report.total.into(),
            prompt_generation: report.prompt_generation.into(),
            tonal_analysis: report.tonal_analysis.into(),
        }
    }
}

impl From<PersistenceStatus> for PersistenceResponse {
    fn from(status: PersistenceStatus) -> Self {
        Self {
            call_id: status.call_id,
            domain_specific_saved: status.domain_specific_saved,
            tonal_analysis_saved: status.tonal_analysis_saved,
            error: status.error,
        }
    }
}

impl From<TranscriptionResult> for TranscriptionResponse {
    fn from(result: TranscriptionResult) -> Self {
        Self {
            file_name: result.file_name,
            transcript: result.transcript,
            domain: result.domain,
            category: result.category,
            prompt_source: result.prompt_source.to_string(),
            domain_specific_data: result.domain_specific_data,
            general_metrics: result.general_metrics,
            extraction_error: result.extraction_error,
            tonal_analysis: result.tonal_analysis,
            tonal_error: result.tonal_error,
            persistence: result.persistence.into(),
            token_usage: result.token_usage.into(),
        }
    }
}

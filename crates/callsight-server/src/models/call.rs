//! Stored calls and service statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use callsight::{CallRecord, DomainSpecificRecord, TonalAnalysis};

/// Stored call record ("general" row)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CallRecordResponse {
    pub id: i64,
    pub file_name: String,
    pub domain: String,
    pub category: String,
    pub agent_name: String,
    pub customer_name: String,
    pub call_direction: String,
    pub interaction_type: String,
    pub sentiment: String,
    pub intent: String,
    pub tokens_input: i64,
    pub tokens_output: i64,
    pub total_tokens: i64,
    pub created_at: DateTime<Utc>,
}

/// Domain-specific payload linked to a call
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DomainSpecificResponse {
    pub id: i64,
    pub call_id: i64,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Tonal analysis linked to a call
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TonalAnalysisResponse {
    pub id: i64,
    pub call_id: Option<i64>,
    pub file_name: String,
    pub overall_sentiment: Option<String>,
    pub data: serde_json::Value,
    pub tokens_input: i64,
    pub tokens_output: i64,
    pub created_at: DateTime<Utc>,
}

/// Call record with its payload and tonal analysis; either is absent when it
/// was never stored
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CallDetailResponse {
    pub call: CallRecordResponse,
    pub domain_specific: Option<DomainSpecificResponse>,
    pub tonal_analysis: Option<TonalAnalysisResponse>,
}

/// Row counts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_calls: i64,
    pub domain_specific_records: i64,
    pub prompts: i64,
    pub known_pairs: usize,
}

impl From<CallRecord> for CallRecordResponse {
    fn from(record: CallRecord) -> Self {
        let meta = record.metadata;
        Self {
            id: record.id,
            file_name: record.file_name,
            domain: record.domain,
            category: record.category,
            agent_name: meta.agent_name,
            customer_name: meta.customer_name,
            call_direction: meta.call_direction,
            interaction_type: meta.interaction_type,
            sentiment: meta.sentiment,
            intent: meta.intent,
            tokens_input: record.tokens_input,
            tokens_output: record.tokens_output,
            total_tokens: record.total_tokens,
            created_at: record.created_at,
        }
    }
}

impl From<DomainSpecificRecord> for DomainSpecificResponse {
    fn from(record: DomainSpecificRecord) -> Self {
        Self {
            id: record.id,
            call_id: record.call_id,
            data: record.data,
            created_at: record.created_at,
        }
    }
}

impl From<TonalAnalysis> for TonalAnalysisResponse {
    fn from(record: TonalAnalysis) -> Self {
        Self {
            overall_sentiment: record.overall_sentiment().map(str::to_string),
            id: record.id,
            call_id: record.call_id,
            file_name: record.file_name,
            data: record.data,
            tokens_input: record.tokens_input,
            tokens_output: record.tokens_output,
            created_at: record.created_at,
        }
    }
}

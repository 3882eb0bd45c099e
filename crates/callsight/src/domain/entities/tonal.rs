//! Tonal Analysis - Tone and sentiment read from the call audio
//!
//! Stored next to the call record but independent of it: the analysis is
//! kept even when the call record could not be written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::TokenUsage;

/// Fields of a tonal analysis before storage assigns an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTonalAnalysis {
    /// Unset when the call record itself was not stored
    pub call_id: Option<i64>,
    pub file_name: String,
    pub data: serde_json::Value,
    pub tokens_input: i64,
    pub tokens_output: i64,
}

impl NewTonalAnalysis {
    pub fn new(
        call_id: Option<i64>,
        file_name: impl Into<String>,
        data: serde_json::Value,
        usage: TokenUsage,
    ) -> Self {
        Self {
            call_id,
            file_name: file_name.into(),
            data,
            tokens_input: usage.input_tokens as i64,
            tokens_output: usage.output_tokens as i64,
        }
    }
}

/// A stored tonal analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TonalAnalysis {
    pub id: i64,
    pub call_id: Option<i64>,
    pub file_name: String,
    pub data: serde_json::Value,
    pub tokens_input: i64,
    pub tokens_output: i64,
    pub created_at: DateTime<Utc>,
}

impl TonalAnalysis {
    /// `overall_analysis.overall_sentiment`, if the model reported one.
    pub fn overall_sentiment(&self) -> Option<&str> {
        self.data
            .get("overall_analysis")?
            .get("overall_sentiment")?
            .as_str()
    }
}

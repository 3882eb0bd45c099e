//! Call - One processed audio upload and its domain-specific payload
//!
//! Pure domain entities without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CallMetadata, DomainCategoryPair};
use crate::domain::value_objects::TokenUsage;

/// Fields of a call record before storage assigns an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCallRecord {
    pub file_name: String,
    pub domain: String,
    pub category: String,
    #[serde(flatten)]
    pub metadata: CallMetadata,
    pub tokens_input: i64,
    pub tokens_output: i64,
    pub total_tokens: i64,
}

impl NewCallRecord {
    pub fn new(
        file_name: impl Into<String>,
        pair: &DomainCategoryPair,
        metadata: CallMetadata,
        total: TokenUsage,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            domain: pair.domain.clone(),
            category: pair.category.clone(),
            metadata,
            tokens_input: total.input_tokens as i64,
            tokens_output: total.output_tokens as i64,
            total_tokens: total.total() as i64,
        }
    }
}

/// A stored call record ("general" row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: i64,
    pub file_name: String,
    pub domain: String,
    pub category: String,
    #[serde(flatten)]
    pub metadata: CallMetadata,
    pub tokens_input: i64,
    pub tokens_output: i64,
    pub total_tokens: i64,
    pub created_at: DateTime<Utc>,
}

/// Domain-specific extraction payload linked to a call record
///
/// A call record without one is a valid, recoverable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSpecificRecord {
    pub id: i64,
    pub call_id: i64,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_call_record_totals() {
        let pair = DomainCategoryPair::new("insurance", "claim_inquiry");
        let record = NewCallRecord::new(
            "call.wav",
            &pair,
            CallMetadata::default(),
            TokenUsage::new(1200, 300),
        );

        assert_eq!(record.domain, "insurance");
        assert_eq!(record.tokens_input, 1200);
        assert_eq!(record.tokens_output, 300);
        assert_eq!(record.total_tokens, 1500);
    }
}

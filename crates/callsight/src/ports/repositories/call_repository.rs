//! Call Repository Port
//!
//! Abstract interface for call records, their domain-specific payloads and
//! their tonal analyses.

use async_trait::async_trait;

use crate::domain::{
    errors::DomainError, CallRecord, DomainSpecificRecord, NewCallRecord, NewTonalAnalysis,
    TonalAnalysis,
};

/// Row counts across the call tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub total_calls: i64,
    pub domain_specific_records: i64,
}

/// Repository interface for call records
#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Insert a call record, returning its generated id
    async fn insert_call(&self, record: &NewCallRecord) -> Result<i64, DomainError>;

    /// Insert the domain-specific payload for an existing call
    async fn insert_domain_specific(
        &self,
        call_id: i64,
        payload: &serde_json::Value,
    ) -> Result<i64, DomainError>;

    /// Insert a tonal analysis, returning its generated id
    async fn insert_tonal_analysis(&self, analysis: &NewTonalAnalysis) -> Result<i64, DomainError>;

    /// Find a call record by id
    async fn find_call(&self, id: i64) -> Result<Option<CallRecord>, DomainError>;

    /// Find the domain-specific payload linked to a call
    async fn find_domain_specific(
        &self,
        call_id: i64,
    ) -> Result<Option<DomainSpecificRecord>, DomainError>;

    /// Find the tonal analysis linked to a call
    async fn find_tonal_analysis(&self, call_id: i64) -> Result<Option<TonalAnalysis>, DomainError>;

    /// Row counts
    async fn stats(&self) -> Result<CallStats, DomainError>;
}

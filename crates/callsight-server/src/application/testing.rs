//! In-memory port implementations for application tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use callsight::{
    CallRecord, CallRepository, CallStats, DomainCategoryPair, DomainError, DomainSpecificRecord,
    InferenceProvider, InferenceRequest, InferenceResponse, NewCallRecord, NewTonalAnalysis,
    PromptRecord, PromptRepository, TokenUsage, TonalAnalysis,
};
use chrono::Utc;

use super::gateway::{Gateway, GatewayConfig};

/// Gateway with millisecond back-off so retry paths stay fast.
pub fn fast_gateway() -> Gateway {
    Gateway::new(GatewayConfig {
        max_attempts: 3,
        backoff_base: Duration::from_millis(1),
        inference_timeout: Duration::from_millis(500),
        storage_timeout: Duration::from_millis(500),
    })
}

/// Inference backend answering from a script, in call order.
///
/// Runs out of script with a non-transient error.
#[derive(Default)]
pub struct ScriptedInference {
    script: Mutex<VecDeque<Result<InferenceResponse, DomainError>>>,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl ScriptedInference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>, input: u32, output: u32) -> Self {
        self.push(Ok(InferenceResponse {
            text: text.into(),
            usage: TokenUsage::new(input, output),
        }))
    }

    pub fn fail(self, error: DomainError) -> Self {
        self.push(Err(error))
    }

    fn push(self, entry: Result<InferenceResponse, DomainError>) -> Self {
        self.script.lock().unwrap().push_back(entry);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceProvider for ScriptedInference {
    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceResponse, DomainError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::Validation("script exhausted".into())))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }
}

#[derive(Default)]
pub struct MemoryPromptRepository {
    records: Mutex<Vec<PromptRecord>>,
    pub fail_reads: AtomicBool,
    pub fail_inserts: AtomicBool,
}

impl MemoryPromptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding the two stock exemplars, ids 1 and 2.
    pub fn seeded() -> Self {
        let repo = Self::new();
        repo.put(
            "healthcare",
            "appointment_scheduling",
            "Extract the appointment date, time and provider.",
        );
        repo.put(
            "insurance",
            "claim_inquiry",
            "Extract the claim number, claim status and amounts.",
        );
        repo
    }

    pub fn put(&self, domain: &str, category: &str, text: &str) -> i64 {
        let mut records = self.records.lock().unwrap();
        let id = records.len() as i64 + 1;
        records.push(PromptRecord {
            id,
            domain: domain.to_string(),
            category: category.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        });
        id
    }

    pub fn records(&self) -> Vec<PromptRecord> {
        self.records.lock().unwrap().clone()
    }

    fn check_reads(&self) -> Result<(), DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("prompts unreadable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PromptRepository for MemoryPromptRepository {
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<PromptRecord>, DomainError> {
        self.check_reads()?;
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn find_by_pair(
        &self,
        pair: &DomainCategoryPair,
    ) -> Result<Option<PromptRecord>, DomainError> {
        self.check_reads()?;
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.pair() == *pair).cloned())
    }

    async fn find_known_pairs(&self) -> Result<Vec<DomainCategoryPair>, DomainError> {
        self.check_reads()?;
        let records = self.records.lock().unwrap();
        let mut pairs: Vec<_> = records.iter().map(PromptRecord::pair).collect();
        pairs.sort();
        pairs.dedup();
        Ok(pairs)
    }

    async fn insert(&self, pair: &DomainCategoryPair, text: &str) -> Result<i64, DomainError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("prompt insert refused".into()));
        }
        Ok(self.put(&pair.domain, &pair.category, text))
    }

    async fn count(&self) -> Result<i64, DomainError> {
        self.check_reads()?;
        Ok(self.records.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct MemoryCallRepository {
    calls: Mutex<Vec<CallRecord>>,
    domain_specific: Mutex<Vec<DomainSpecificRecord>>,
    tonal: Mutex<Vec<TonalAnalysis>>,
    /// Call inserts time out, a transient failure
    pub fail_call_inserts: AtomicBool,
    pub fail_domain_specific_inserts: AtomicBool,
    pub fail_tonal_inserts: AtomicBool,
    pub call_attempts: AtomicU32,
    pub domain_specific_attempts: AtomicU32,
}

impl MemoryCallRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn domain_specific(&self) -> Vec<DomainSpecificRecord> {
        self.domain_specific.lock().unwrap().clone()
    }

    pub fn tonal_analyses(&self) -> Vec<TonalAnalysis> {
        self.tonal.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallRepository for MemoryCallRepository {
    async fn insert_call(&self, record: &NewCallRecord) -> Result<i64, DomainError> {
        self.call_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_call_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::Timeout("general insert timed out".into()));
        }
        let mut calls = self.calls.lock().unwrap();
        let id = calls.len() as i64 + 1;
        calls.push(CallRecord {
            id,
            file_name: record.file_name.clone(),
            domain: record.domain.clone(),
            category: record.category.clone(),
            metadata: record.metadata.clone(),
            tokens_input: record.tokens_input,
            tokens_output: record.tokens_output,
            total_tokens: record.total_tokens,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn insert_domain_specific(
        &self,
        call_id: i64,
        payload: &serde_json::Value,
    ) -> Result<i64, DomainError> {
        self.domain_specific_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_domain_specific_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("domain_specific insert refused".into()));
        }
        if !self.calls.lock().unwrap().iter().any(|c| c.id == call_id) {
            return Err(DomainError::Repository(format!("foreign key: no call {}", call_id)));
        }
        let mut rows = self.domain_specific.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(DomainSpecificRecord {
            id,
            call_id,
            data: payload.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn insert_tonal_analysis(&self, analysis: &NewTonalAnalysis) -> Result<i64, DomainError> {
        if self.fail_tonal_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("tonal_analysis insert refused".into()));
        }
        let mut rows = self.tonal.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(TonalAnalysis {
            id,
            call_id: analysis.call_id,
            file_name: analysis.file_name.clone(),
            data: analysis.data.clone(),
            tokens_input: analysis.tokens_input,
            tokens_output: analysis.tokens_output,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_call(&self, id: i64) -> Result<Option<CallRecord>, DomainError> {
        Ok(self.calls.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn find_domain_specific(
        &self,
        call_id: i64,
    ) -> Result<Option<DomainSpecificRecord>, DomainError> {
        Ok(self
            .domain_specific
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.call_id == call_id)
            .cloned())
    }

    async fn find_tonal_analysis(&self, call_id: i64) -> Result<Option<TonalAnalysis>, DomainError> {
        Ok(self
            .tonal
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.call_id == Some(call_id))
            .cloned())
    }

    async fn stats(&self) -> Result<CallStats, DomainError> {
        Ok(CallStats {
            total_calls: self.calls.lock().unwrap().len() as i64,
            domain_specific_records: self.domain_specific.lock().unwrap().len() as i64,
        })
    }
}

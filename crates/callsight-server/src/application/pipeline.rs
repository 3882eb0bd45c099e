//! Transcription Pipeline - Orchestrates one upload end to end
//!
//! `Received → Transcribing → AnalyzingTone → ResolvingPrompt → Extracting →
//! Persisting → Done`. Only `Transcribing` can move to `Failed`; every later
//! stage degrades and the request still gets a full result.

use std::sync::Arc;

use callsight::{
    AudioPayload, CallRepository, DomainKnowledge, InferenceProvider, NewCallRecord,
    NewTonalAnalysis, PromptRepository, PromptSource, TokenUsage,
};
use serde_json::Value;

use super::error::PipelineError;
use super::gateway::Gateway;
use super::persistence::PersistenceCoordinator;
use super::prompt_resolver::PromptResolver;
use super::prompt_writer::PromptWriter;
use super::stage_runner::StageRunner;

/// Pipeline state, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    Transcribing,
    AnalyzingTone,
    ResolvingPrompt,
    Extracting,
    Persisting,
    Done,
    Failed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Received => "received",
            PipelineState::Transcribing => "transcribing",
            PipelineState::AnalyzingTone => "analyzing_tone",
            PipelineState::ResolvingPrompt => "resolving_prompt",
            PipelineState::Extracting => "extracting",
            PipelineState::Persisting => "persisting",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of the persistence stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistenceStatus {
    /// Set when the call record was stored
    pub call_id: Option<i64>,
    pub domain_specific_saved: bool,
    pub tonal_analysis_saved: bool,
    pub error: Option<String>,
}

/// Token accounting per stage. `total` is always `stage1 + stage2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenReport {
    pub stage1: TokenUsage,
    pub stage2: TokenUsage,
    pub total: TokenUsage,
    /// Spent generating a prompt for a new pair; reported, not in `total`
    pub prompt_generation: TokenUsage,
    /// Spent on the tonal pass; reported, not in `total`
    pub tonal_analysis: TokenUsage,
}

impl TokenReport {
    pub fn new(
        stage1: TokenUsage,
        stage2: TokenUsage,
        prompt_generation: TokenUsage,
        tonal_analysis: TokenUsage,
    ) -> Self {
        Self {
            stage1,
            stage2,
            total: stage1 + stage2,
            prompt_generation,
            tonal_analysis,
        }
    }
}

/// Aggregate result of one processed upload
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    pub file_name: String,
    pub transcript: String,
    pub domain: String,
    pub category: String,
    pub prompt_source: PromptSource,
    pub domain_specific_data: Value,
    pub general_metrics: Value,
    /// Set when extraction degraded to empty data
    pub extraction_error: Option<String>,
    /// Tone and sentiment of the audio; `{}` when the tonal pass degraded
    pub tonal_analysis: Value,
    pub tonal_error: Option<String>,
    pub persistence: PersistenceStatus,
    pub token_usage: TokenReport,
}

pub struct TranscriptionPipeline<I, P, C>
where
    I: InferenceProvider,
    P: PromptRepository,
    C: CallRepository,
{
    stages: StageRunner<I>,
    resolver: PromptResolver<I, P>,
    persistence: PersistenceCoordinator<C>,
}

impl<I, P, C> TranscriptionPipeline<I, P, C>
where
    I: InferenceProvider,
    P: PromptRepository,
    C: CallRepository,
{
    pub fn new(
        inference: Arc<I>,
        prompts: Arc<P>,
        calls: Arc<C>,
        knowledge: Arc<DomainKnowledge>,
        writer: PromptWriter,
        gateway: Gateway,
        example_prompt_ids: Vec<i64>,
    ) -> Self {
        Self {
            stages: StageRunner::new(inference.clone(), knowledge.clone(), gateway.clone()),
            resolver: PromptResolver::new(
                inference,
                prompts,
                knowledge,
                writer,
                gateway.clone(),
                example_prompt_ids,
            ),
            persistence: PersistenceCoordinator::new(calls, gateway),
        }
    }

    /// Process one upload.
    ///
    /// Errors only when no transcript could be produced.
    pub async fn process(
        &self,
        file_name: &str,
        audio: AudioPayload,
    ) -> Result<TranscriptionResult, PipelineError> {
        let mut state = PipelineState::Received;
        tracing::info!(
            "📥 Processing {} ({} bytes, {})",
            file_name,
            audio.bytes.len(),
            audio.mime_type
        );

        advance(&mut state, PipelineState::Transcribing);
        let call = match self.stages.classify(&audio).await {
            Ok(call) => call,
            Err(e) => {
                advance(&mut state, PipelineState::Failed);
                tracing::error!("❌ Transcription failed for {}: {}", file_name, e);
                return Err(PipelineError::Transcription(e));
            }
        };

        advance(&mut state, PipelineState::AnalyzingTone);
        let tone = self.stages.analyze_tone(&audio).await;
        drop(audio);

        advance(&mut state, PipelineState::ResolvingPrompt);
        let prompt = self.resolver.resolve(call.pair(), call.transcript()).await;

        advance(&mut state, PipelineState::Extracting);
        let extraction = self.stages.extract(&call, &prompt).await;

        advance(&mut state, PipelineState::Persisting);
        let token_usage =
            TokenReport::new(call.usage(), extraction.usage, prompt.usage, tone.usage);
        let record = NewCallRecord::new(
            file_name,
            call.pair(),
            extraction.metadata.clone(),
            token_usage.total,
        );
        let mut persistence = match self
            .persistence
            .commit(&record, &extraction.domain_specific)
            .await
        {
            Ok(outcome) => PersistenceStatus {
                call_id: Some(outcome.call_id),
                domain_specific_saved: outcome.domain_specific_saved,
                tonal_analysis_saved: false,
                error: outcome.domain_specific_error,
            },
            Err(e) => {
                tracing::error!("❌ Call record not saved for {}: {}", file_name, e);
                PersistenceStatus {
                    call_id: None,
                    domain_specific_saved: false,
                    tonal_analysis_saved: false,
                    error: Some(e.to_string()),
                }
            }
        };
        if tone.is_available() {
            let analysis = NewTonalAnalysis::new(
                persistence.call_id,
                file_name,
                tone.data.clone(),
                tone.usage,
            );
            persistence.tonal_analysis_saved = self.persistence.save_tonal(&analysis).await;
        }

        advance(&mut state, PipelineState::Done);
        tracing::info!(
            "✅ {} done: {} via {} prompt, {} tokens",
            file_name,
            call.pair(),
            prompt.source,
            token_usage.total.total()
        );

        let pair = call.pair().clone();
        Ok(TranscriptionResult {
            file_name: file_name.to_string(),
            transcript: call.transcript().to_string(),
            domain: pair.domain,
            category: pair.category,
            prompt_source: prompt.source,
            domain_specific_data: extraction.domain_specific,
            general_metrics: extraction.general_metrics,
            extraction_error: extraction.error,
            tonal_analysis: tone.data,
            tonal_error: tone.error,
            persistence,
            token_usage,
        })
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!("🔀 {} -> {}", state, next);
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::StageError;
    use crate::application::gateway::GatewayError;
    use crate::application::testing::{
        fast_gateway, MemoryCallRepository, MemoryPromptRepository, ScriptedInference,
    };
    use callsight::{DomainCategoryPair, DomainError, PromptRecord};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    struct Harness {
        inference: Arc<ScriptedInference>,
        prompts: Arc<MemoryPromptRepository>,
        calls: Arc<MemoryCallRepository>,
        knowledge: Arc<DomainKnowledge>,
        pipeline: TranscriptionPipeline<
            ScriptedInference,
            MemoryPromptRepository,
            MemoryCallRepository,
        >,
    }

    fn harness(inference: ScriptedInference) -> Harness {
        let inference = Arc::new(inference);
        let prompts = Arc::new(MemoryPromptRepository::seeded());
        let calls = Arc::new(MemoryCallRepository::new());
        let knowledge = Arc::new(DomainKnowledge::new());
        knowledge.seed(prompts.records().iter().map(PromptRecord::pair));
        let (writer, _handle) = PromptWriter::spawn(prompts.clone(), fast_gateway(), 8);
        let pipeline = TranscriptionPipeline::new(
            inference.clone(),
            prompts.clone(),
            calls.clone(),
            knowledge.clone(),
            writer,
            fast_gateway(),
            vec![1, 2],
        );
        Harness {
            inference,
            prompts,
            calls,
            knowledge,
            pipeline,
        }
    }

    fn audio() -> AudioPayload {
        AudioPayload::new(vec![0u8; 16], "audio/mpeg")
    }

    fn stage1(domain: &str, category: &str) -> String {
        json!({
            "transcription": "[00:00 - 00:04] Agent: How can I help?",
            "domain": domain,
            "category": category
        })
        .to_string()
    }

    fn tonal() -> String {
        json!({
            "overall_analysis": {"summary": "Visit booked", "overall_sentiment": "Positive", "overall_tone": "Friendly"},
            "key_tonal_shifts": []
        })
        .to_string()
    }

    fn stage2() -> String {
        json!({
            "domain_specific_data": {"appointment_date": "2024-05-02"},
            "general_metrics": {
                "section_1_name_extraction": {"agent_name": "Dana", "customer_name": "Lee"},
                "section_4_summary_of_conversation_in_brief": "Booked a visit."
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_known_pair_full_success() {
        let inference = ScriptedInference::new()
            .reply(stage1("healthcare", "appointment_scheduling"), 900, 120)
            .reply(tonal(), 700, 90)
            .reply(stage2(), 400, 80);
        let h = harness(inference);

        let result = h.pipeline.process("visit.mp3", audio()).await.unwrap();

        assert_eq!(result.domain, "healthcare");
        assert_eq!(result.category, "appointment_scheduling");
        assert_eq!(result.prompt_source, PromptSource::Cached);
        assert_eq!(
            result.domain_specific_data,
            json!({"appointment_date": "2024-05-02"})
        );
        assert!(result.extraction_error.is_none());
        assert!(result.persistence.domain_specific_saved);
        assert!(result.persistence.tonal_analysis_saved);
        assert_eq!(result.persistence.call_id, Some(1));
        assert_eq!(result.tonal_analysis["overall_analysis"]["overall_sentiment"], "Positive");
        assert!(result.tonal_error.is_none());
        assert_eq!(result.token_usage.tonal_analysis, TokenUsage::new(700, 90));
        assert_eq!(h.inference.calls(), 3);

        let stored = &h.calls.calls()[0];
        assert_eq!(stored.file_name, "visit.mp3");
        assert_eq!(stored.metadata.agent_name, "Dana");
        assert_eq!(stored.total_tokens, 1500);

        let tonal = &h.calls.tonal_analyses()[0];
        assert_eq!(tonal.call_id, Some(1));
        assert_eq!(tonal.tokens_input, 700);
    }

    #[tokio::test]
    async fn test_new_pair_generates_prompt() {
        let inference = ScriptedInference::new()
            .reply(stage1("retail", "return_request"), 900, 120)
            .reply(tonal(), 700, 90)
            .reply("Extract the order number and return reason.", 300, 40)
            .reply(stage2(), 400, 80);
        let h = harness(inference);
        let pair = DomainCategoryPair::new("retail", "return_request");

        let result = h.pipeline.process("return.wav", audio()).await.unwrap();

        assert_eq!(result.prompt_source, PromptSource::Generated);
        assert!(h.knowledge.is_known(&pair));
        assert_eq!(result.token_usage.prompt_generation, TokenUsage::new(300, 40));
        assert_eq!(result.token_usage.total, TokenUsage::new(1300, 200));

        let extraction_request = &h.inference.requests()[3];
        assert!(extraction_request
            .instructions
            .contains("Extract the order number and return reason."));

        // the writer runs detached; give it a moment to land
        for _ in 0..50 {
            if h.prompts.records().len() == 3 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(h.prompts.records()[2].pair(), pair);
    }

    #[tokio::test]
    async fn test_domain_specific_failure_is_partial() {
        let inference = ScriptedInference::new()
            .reply(stage1("insurance", "claim_inquiry"), 900, 120)
            .reply(tonal(), 700, 90)
            .reply(stage2(), 400, 80);
        let h = harness(inference);
        h.calls
            .fail_domain_specific_inserts
            .store(true, Ordering::SeqCst);

        let result = h.pipeline.process("claim.mp3", audio()).await.unwrap();

        assert_eq!(result.persistence.call_id, Some(1));
        assert!(!result.persistence.domain_specific_saved);
        assert!(result.persistence.error.is_some());
        assert!(!result.transcript.is_empty());
        assert_eq!(h.calls.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_call_insert_failure_still_responds() {
        let inference = ScriptedInference::new()
            .reply(stage1("insurance", "claim_inquiry"), 900, 120)
            .reply(tonal(), 700, 90)
            .reply(stage2(), 400, 80);
        let h = harness(inference);
        h.calls.fail_call_inserts.store(true, Ordering::SeqCst);

        let result = h.pipeline.process("claim.mp3", audio()).await.unwrap();

        assert_eq!(result.persistence.call_id, None);
        assert!(!result.persistence.domain_specific_saved);
        assert!(result.persistence.error.is_some());
        assert_eq!(h.calls.call_attempts.load(Ordering::SeqCst), 1);
        assert_eq!(h.calls.domain_specific_attempts.load(Ordering::SeqCst), 0);
        assert!(h.calls.calls().is_empty());

        assert!(result.persistence.tonal_analysis_saved);
        assert_eq!(h.calls.tonal_analyses()[0].call_id, None);
    }

    #[tokio::test]
    async fn test_transcription_failure_aborts() {
        let inference =
            ScriptedInference::new().fail(DomainError::Validation("unsupported audio".into()));
        let h = harness(inference);

        let err = h.pipeline.process("noise.mp3", audio()).await.unwrap_err();

        assert_eq!(err.code(), "transcription_failed");
        assert_eq!(h.inference.calls(), 1);
        assert!(h.calls.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transcription_retries_exhausted_aborts() {
        let inference = ScriptedInference::new()
            .fail(DomainError::Unavailable("503".into()))
            .fail(DomainError::Unavailable("503".into()))
            .fail(DomainError::Unavailable("503".into()));
        let h = harness(inference);

        let err = h.pipeline.process("noise.mp3", audio()).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Transcription(StageError::Gateway(GatewayError::Exhausted {
                attempts: 3,
                ..
            }))
        ));
        assert_eq!(h.inference.calls(), 3);
        assert!(h.calls.calls().is_empty());
        assert!(h.calls.tonal_analyses().is_empty());
    }

    #[tokio::test]
    async fn test_tonal_failure_degrades() {
        let inference = ScriptedInference::new()
            .reply(stage1("healthcare", "appointment_scheduling"), 900, 120)
            .fail(DomainError::Validation("audio too long".into()))
            .reply(stage2(), 400, 80);
        let h = harness(inference);

        let result = h.pipeline.process("visit.mp3", audio()).await.unwrap();

        assert_eq!(result.tonal_analysis, json!({}));
        assert!(result.tonal_error.is_some());
        assert!(!result.persistence.tonal_analysis_saved);
        assert!(h.calls.tonal_analyses().is_empty());
        assert_eq!(
            result.domain_specific_data,
            json!({"appointment_date": "2024-05-02"})
        );
        assert!(result.persistence.domain_specific_saved);
        assert_eq!(result.token_usage.total, TokenUsage::new(1300, 200));
    }

    #[tokio::test]
    async fn test_extraction_failure_degrades() {
        let inference = ScriptedInference::new()
            .reply(stage1("healthcare", "appointment_scheduling"), 900, 120)
            .reply(tonal(), 700, 90)
            .fail(DomainError::Validation("refused".into()));
        let h = harness(inference);

        let result = h.pipeline.process("visit.mp3", audio()).await.unwrap();

        assert_eq!(result.domain, "healthcare");
        assert!(!result.transcript.is_empty());
        assert_eq!(result.domain_specific_data, json!({}));
        assert_eq!(result.general_metrics, json!({}));
        assert!(result.extraction_error.is_some());
        assert!(result.persistence.domain_specific_saved);
        assert_eq!(h.calls.calls()[0].metadata.agent_name, "Not Available");
        assert_eq!(result.token_usage.total, TokenUsage::new(900, 120));
    }

    #[test]
    fn test_token_total_is_stage_sum() {
        for (a, b) in [((0, 0), (0, 0)), ((900, 120), (400, 80)), ((1, 2), (3, 4))] {
            let s1 = TokenUsage::new(a.0, a.1);
            let s2 = TokenUsage::new(b.0, b.1);
            let report = TokenReport::new(s1, s2, TokenUsage::new(50, 5), TokenUsage::new(70, 9));
            assert_eq!(report.total.input_tokens, s1.input_tokens + s2.input_tokens);
            assert_eq!(report.total.output_tokens, s1.output_tokens + s2.output_tokens);
        }
    }
}

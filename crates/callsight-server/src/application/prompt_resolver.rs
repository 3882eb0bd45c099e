//! Prompt Resolver - Extraction instructions for a classified call
//!
//! Known pair: reuse the stored prompt. New pair: generate one from the
//! exemplar prompts, register the pair and queue the prompt for storage.
//! Anything that goes wrong on either path degrades to [`FALLBACK_PROMPT`].

use std::sync::Arc;

use callsight::{
    DomainCategoryPair, DomainKnowledge, InferenceProvider, InferenceRequest, PromptRecord,
    PromptRepository, PromptSource, TokenUsage,
};
use thiserror::Error;

use super::gateway::{Gateway, GatewayError};
use super::instructions::{self, FALLBACK_PROMPT};
use super::prompt_writer::PromptWriter;

/// Transcript characters passed along to prompt generation
const TRANSCRIPT_EXCERPT_CHARS: usize = 4_000;

/// Extraction instructions and where they came from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrompt {
    pub source: PromptSource,
    pub text: String,
    /// Tokens spent generating the prompt, zero unless `Generated`
    pub usage: TokenUsage,
}

impl ResolvedPrompt {
    pub fn fallback() -> Self {
        Self {
            source: PromptSource::Fallback,
            text: FALLBACK_PROMPT.to_string(),
            usage: TokenUsage::default(),
        }
    }
}

/// Why a specialised prompt could not be resolved
#[derive(Debug, Error)]
pub enum ResolutionFailure {
    #[error("prompt lookup failed: {0}")]
    Lookup(#[source] GatewayError),

    #[error("known pair {0} has no stored prompt")]
    MissingPrompt(DomainCategoryPair),

    #[error("prompt generation failed: {0}")]
    Generation(#[source] GatewayError),

    #[error("prompt generation returned empty text")]
    EmptyGeneration,
}

pub struct PromptResolver<I, P>
where
    I: InferenceProvider,
    P: PromptRepository,
{
    inference: Arc<I>,
    prompts: Arc<P>,
    knowledge: Arc<DomainKnowledge>,
    writer: PromptWriter,
    gateway: Gateway,
    example_ids: Vec<i64>,
}

impl<I, P> PromptResolver<I, P>
where
    I: InferenceProvider,
    P: PromptRepository,
{
    pub fn new(
        inference: Arc<I>,
        prompts: Arc<P>,
        knowledge: Arc<DomainKnowledge>,
        writer: PromptWriter,
        gateway: Gateway,
        example_ids: Vec<i64>,
    ) -> Self {
        Self {
            inference,
            prompts,
            knowledge,
            writer,
            gateway,
            example_ids,
        }
    }

    /// Resolve extraction instructions. Never fails: every failure path ends
    /// in the fallback prompt.
    pub async fn resolve(&self, pair: &DomainCategoryPair, transcript: &str) -> ResolvedPrompt {
        match self.try_resolve(pair, transcript).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!("⚠️  Using fallback prompt for {}: {}", pair, e);
                ResolvedPrompt::fallback()
            }
        }
    }

    /// Resolve without the fallback, surfacing why resolution failed.
    pub async fn try_resolve(
        &self,
        pair: &DomainCategoryPair,
        transcript: &str,
    ) -> Result<ResolvedPrompt, ResolutionFailure> {
        if self.knowledge.is_known(pair) {
            return self.cached(pair).await;
        }
        self.generate(pair, transcript).await
    }

    async fn cached(&self, pair: &DomainCategoryPair) -> Result<ResolvedPrompt, ResolutionFailure> {
        let prompts = &self.prompts;
        let record = self
            .gateway
            .storage("find_prompt", move || prompts.find_by_pair(pair))
            .await
            .map_err(ResolutionFailure::Lookup)?
            .ok_or_else(|| ResolutionFailure::MissingPrompt(pair.clone()))?;

        tracing::debug!("📖 Cached prompt {} for {}", record.id, pair);
        Ok(ResolvedPrompt {
            source: PromptSource::Cached,
            text: record.text,
            usage: TokenUsage::default(),
        })
    }

    async fn generate(
        &self,
        pair: &DomainCategoryPair,
        transcript: &str,
    ) -> Result<ResolvedPrompt, ResolutionFailure> {
        let examples = self.examples().await;
        let request = InferenceRequest::new(instructions::prompt_generation(pair, &examples))
            .with_context(excerpt(transcript));

        let inference = &self.inference;
        let request = &request;
        let response = self
            .gateway
            .inference("generate_prompt", move || inference.generate(request))
            .await
            .map_err(ResolutionFailure::Generation)?;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(ResolutionFailure::EmptyGeneration);
        }

        // Register before queueing so a concurrent request for the same pair
        // takes the cached path instead of generating again.
        self.knowledge.learn(pair);
        self.writer.submit(pair, text);

        tracing::info!(
            "🧠 Generated prompt for {} ({} exemplars)",
            pair,
            examples.len()
        );
        Ok(ResolvedPrompt {
            source: PromptSource::Generated,
            text: text.to_string(),
            usage: response.usage,
        })
    }

    /// Exemplar prompts. Generation proceeds without them if the lookup fails.
    async fn examples(&self) -> Vec<PromptRecord> {
        let prompts = &self.prompts;
        let ids = self.example_ids.as_slice();
        match self
            .gateway
            .storage("find_example_prompts", move || prompts.find_by_ids(ids))
            .await
        {
            Ok(examples) => examples,
            Err(e) => {
                tracing::warn!("⚠️  Example prompts unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

fn excerpt(transcript: &str) -> String {
    match transcript.char_indices().nth(TRANSCRIPT_EXCERPT_CHARS) {
        Some((end, _)) => transcript[..end].to_string(),
        None => transcript.to_string(),
    }
}

//! Inference Provider Port
//!
//! Abstract interface for language-model invocations. The pipeline only
//! needs one call shape: instructions, optionally with audio attached and
//! optional context text, answered with text plus token counts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{AudioPayload, TokenUsage};

/// A single inference request
#[derive(Debug, Clone, Default)]
pub struct InferenceRequest {
    /// Instructions for the model
    pub instructions: String,
    /// Audio to attach inline
    pub audio: Option<AudioPayload>,
    /// Extra text appended after the instructions
    pub context_text: Option<String>,
}

impl InferenceRequest {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ..Default::default()
        }
    }

    pub fn with_audio(mut self, audio: AudioPayload) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_text = Some(context.into());
        self
    }
}

/// Model answer with token accounting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub text: String,
    pub usage: TokenUsage,
}

/// Inference backend interface
///
/// Implementations report failures with the transient variants of
/// [`DomainError`] (`Timeout`, `Unavailable`, `RateLimited`) when a retry may
/// help, and `Validation` / `ExternalService` otherwise. Retrying is the
/// caller's concern.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Run one generation request
    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceResponse, DomainError>;

    /// Get the provider name (e.g., "gemini")
    fn provider_name(&self) -> &str;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}

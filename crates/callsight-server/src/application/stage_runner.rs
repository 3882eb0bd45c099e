//! Stage Runner - The two inference stages
//!
//! Stage 1 transcribes and classifies the audio; its failure is fatal.
//! Stage 2 extracts domain-specific data plus general metrics from the
//! transcript; its failure yields an empty extraction with the error noted.
//! The tonal pass reads tone from the audio and degrades the same way.

use std::sync::Arc;

use callsight::{
    AudioPayload, CallMetadata, DomainCategoryPair, DomainKnowledge, GeneralMetrics,
    InferenceProvider, InferenceRequest, TokenUsage,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::StageError;
use super::gateway::Gateway;
use super::instructions;
use super::prompt_resolver::ResolvedPrompt;

/// Label used when the model leaves domain or category blank
pub const UNKNOWN_LABEL: &str = "unknown";

/// Stage 1 output. Only [`StageRunner::classify`] builds one, so stage 2
/// can only ever run on a successfully classified call.
#[derive(Debug, Clone)]
pub struct ClassifiedCall {
    transcript: String,
    pair: DomainCategoryPair,
    usage: TokenUsage,
}

impl ClassifiedCall {
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Never empty; blank model answers become `"unknown"`.
    pub fn pair(&self) -> &DomainCategoryPair {
        &self.pair
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }
}

/// Stage 2 output
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub domain_specific: Value,
    /// General metrics exactly as the model returned them
    pub general_metrics: Value,
    /// Flat fields read leniently out of `general_metrics`
    pub metadata: CallMetadata,
    pub usage: TokenUsage,
    /// Set when the stage degraded to an empty extraction
    pub error: Option<String>,
}

impl Extraction {
    fn degraded(error: &StageError, usage: TokenUsage) -> Self {
        Self {
            domain_specific: Value::Object(Map::new()),
            general_metrics: Value::Object(Map::new()),
            metadata: CallMetadata::default(),
            usage,
            error: Some(error.to_string()),
        }
    }
}

/// Tonal pass output
#[derive(Debug, Clone, Default)]
pub struct TonalReading {
    /// The model's analysis; `{}` when the pass degraded
    pub data: Value,
    pub usage: TokenUsage,
    pub error: Option<String>,
}

impl TonalReading {
    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct ClassificationAnswer {
    #[serde(default, alias = "transcript")]
    transcription: String,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

pub struct StageRunner<I: InferenceProvider> {
    inference: Arc<I>,
    knowledge: Arc<DomainKnowledge>,
    gateway: Gateway,
}

impl<I: InferenceProvider> StageRunner<I> {
    pub fn new(inference: Arc<I>, knowledge: Arc<DomainKnowledge>, gateway: Gateway) -> Self {
        Self {
            inference,
            knowledge,
            gateway,
        }
    }

    /// Stage 1: transcribe and classify, guided by the known pairs.
    pub async fn classify(&self, audio: &AudioPayload) -> Result<ClassifiedCall, StageError> {
        let guidance = self.knowledge.render_guidance();
        let request =
            InferenceRequest::new(instructions::classification(&guidance)).with_audio(audio.clone());

        let inference = &self.inference;
        let request = &request;
        let response = self
            .gateway
            .inference("stage1_classify", move || inference.generate(request))
            .await?;

        let answer: ClassificationAnswer =
            serde_json::from_str(instructions::strip_code_fences(&response.text))
                .map_err(|e| StageError::Malformed(e.to_string()))?;

        let pair = DomainCategoryPair::new(label(answer.domain), label(answer.category));
        tracing::info!(
            "🎙️ Classified as {} ({} transcript chars)",
            pair,
            answer.transcription.len()
        );

        Ok(ClassifiedCall {
            transcript: answer.transcription,
            pair,
            usage: response.usage,
        })
    }

    /// Stage 2: extract with the resolved prompt. Never fails.
    pub async fn extract(&self, call: &ClassifiedCall, prompt: &ResolvedPrompt) -> Extraction {
        let request = InferenceRequest::new(instructions::extraction(call.pair(), &prompt.text))
            .with_context(call.transcript());

        let inference = &self.inference;
        let request = &request;
        let response = match self
            .gateway
            .inference("stage2_extract", move || inference.generate(request))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let error = StageError::from(e);
                tracing::warn!("⚠️  Extraction degraded for {}: {}", call.pair(), error);
                return Extraction::degraded(&error, TokenUsage::default());
            }
        };

        let mut answer = match parse_object(&response.text) {
            Ok(answer) => answer,
            Err(error) => {
                tracing::warn!("⚠️  Extraction degraded for {}: {}", call.pair(), error);
                return Extraction::degraded(&error, response.usage);
            }
        };

        // The two halves are independent; a loose metrics section never
        // costs the domain-specific data.
        let domain_specific = object_or_empty(answer.remove("domain_specific_data"));
        let general_metrics = object_or_empty(answer.remove("general_metrics"));
        let metadata = GeneralMetrics::from_value(&general_metrics).call_metadata();

        Extraction {
            domain_specific,
            general_metrics,
            metadata,
            usage: response.usage,
            error: None,
        }
    }

    /// Tonal pass over the audio. Never fails.
    pub async fn analyze_tone(&self, audio: &AudioPayload) -> TonalReading {
        let request = InferenceRequest::new(instructions::TONAL_ANALYSIS).with_audio(audio.clone());

        let inference = &self.inference;
        let request = &request;
        let result = self
            .gateway
            .inference("tonal_analysis", move || inference.generate(request))
            .await;

        let (outcome, usage) = match result {
            Ok(response) => (parse_object(&response.text), response.usage),
            Err(e) => (Err(StageError::from(e)), TokenUsage::default()),
        };

        match outcome {
            Ok(analysis) => {
                tracing::info!("🎭 Tonal analysis ready ({} fields)", analysis.len());
                TonalReading {
                    data: Value::Object(analysis),
                    usage,
                    error: None,
                }
            }
            Err(error) => {
                tracing::warn!("⚠️  Tonal analysis degraded: {}", error);
                TonalReading {
                    data: Value::Object(Map::new()),
                    usage,
                    error: Some(error.to_string()),
                }
            }
        }
    }
}

fn label(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

fn parse_object(text: &str) -> Result<Map<String, Value>, StageError> {
    match serde_json::from_str::<Value>(instructions::strip_code_fences(text)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StageError::Malformed(format!(
            "expected a JSON object, got {}",
            kind(&other)
        ))),
        Err(e) => Err(StageError::Malformed(e.to_string())),
    }
}

fn object_or_empty(value: Option<Value>) -> Value {
    match value {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(other) => other,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Callsight Domain Library
//!
//! Core domain types and interfaces for the Callsight call-audio analysis
//! pipeline: an uploaded call recording is transcribed and classified into a
//! (domain, category) pair, analysed with instructions specialised for that
//! pair, and persisted as a call record plus a linked domain-specific record.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: DomainCategoryPair, PromptRecord, CallRecord, GeneralMetrics,
//!     TonalAnalysis
//!   - `value_objects/`: TokenUsage, PromptSource, AudioPayload
//!   - `services/`: DomainKnowledge, the shared registry of known pairs
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Prompt and call storage
//!   - `services/`: Inference backend
//!
//! # Usage
//!
//! ```rust,ignore
//! use callsight::{DomainCategoryPair, DomainKnowledge};
//! use callsight::ports::{InferenceProvider, PromptRepository};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    normalize_mime_type, AgentQuality, AudioPayload, CallDirection, CallMetadata, CallRecord,
    DomainCategoryPair, DomainError, DomainKnowledge, DomainSpecificRecord, GeneralMetrics,
    NameExtraction, NewCallRecord, NewTonalAnalysis, PromptRecord, PromptSource, SentimentIntent,
    TokenUsage, TonalAnalysis, DEFAULT_PAIRS, NOT_AVAILABLE,
};
pub use ports::{
    // Repositories
    CallRepository,
    CallStats,
    // Inference
    InferenceProvider,
    InferenceRequest,
    InferenceResponse,
    PromptRepository,
};

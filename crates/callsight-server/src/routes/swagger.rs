//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    CallDetailResponse, CallRecordResponse, DomainSpecificResponse, DomainsResponse,
    ErrorResponse, PersistenceResponse, StatsResponse, TokenReportResponse, TokenUsageResponse,
    TonalAnalysisResponse, TranscriptionResponse,
};

use super::transcribe::TranscribeUpload;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Transcription
        super::transcribe::transcribe,
        // Domains
        super::domain::list_domains,
        // Calls
        super::call::get_call,
        super::call::get_stats,
    ),
    info(
        title = "Callsight API",
        version = "0.1.0",
        description = "Call transcription and analysis pipeline\n\nTranscribes call audio, classifies it by domain and category, and extracts domain-specific data with prompts learned per category.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Transcription", description = "Transcription - Audio upload and analysis"),
        (name = "Domains", description = "Domains - Known domain/category pairs"),
        (name = "Calls", description = "Calls - Stored call records and statistics"),
    ),
    components(
        schemas(
            // Transcription
            TranscribeUpload,
            TranscriptionResponse,
            PersistenceResponse,
            TokenReportResponse,
            TokenUsageResponse,
            ErrorResponse,
            // Domains
            DomainsResponse,
            // Calls
            CallRecordResponse,
            DomainSpecificResponse,
            TonalAnalysisResponse,
            CallDetailResponse,
            StatsResponse,
        )
    ),
)]
pub struct ApiDoc;

//! Pipeline errors
//!
//! Only a transcription failure escapes the pipeline. Extraction and
//! persistence failures are folded into the result as degraded fields.

use thiserror::Error;

use super::gateway::GatewayError;

/// Failure of a single inference stage
#[derive(Debug, Error)]
pub enum StageError {
    /// The model could not be reached or refused the request
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The model answered with something that is not the expected JSON
    #[error("malformed model output: {0}")]
    Malformed(String),
}

/// Fatal pipeline failure
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("transcription failed: {0}")]
    Transcription(#[source] StageError),
}

impl PipelineError {
    /// Machine-readable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Transcription(_) => "transcription_failed",
        }
    }
}

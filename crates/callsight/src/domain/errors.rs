//! Domain Errors
//!
//! Error types for domain operations and the ports that back them.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),
}

impl DomainError {
    /// Whether retrying the same call may succeed.
    ///
    /// Timeouts, connection failures, 5xx answers and rate limiting are
    /// transient. Validation and other client-side failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::Timeout(_) | DomainError::Unavailable(_) | DomainError::RateLimited(_)
        )
    }
}

//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod gemini;
pub mod postgres;

// Re-exports
pub use gemini::GeminiProvider;
pub use postgres::{PgCallRepository, PgPromptRepository};

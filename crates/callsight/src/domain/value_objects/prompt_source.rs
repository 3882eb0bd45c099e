//! PromptSource - Provenance of the extraction instructions

use serde::{Deserialize, Serialize};

/// Where the extraction prompt for a request came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromptSource {
    /// Persisted prompt for a known pair
    Cached,
    /// Freshly generated for a newly discovered pair
    Generated,
    /// Generic instructions used when nothing better could be resolved
    Fallback,
}

impl std::fmt::Display for PromptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptSource::Cached => write!(f, "cached"),
            PromptSource::Generated => write!(f, "generated"),
            PromptSource::Fallback => write!(f, "fallback"),
        }
    }
}

//! PromptRecord - Extraction instructions for a domain/category pair
//!
//! Owned by storage. Inserted once, never updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DomainCategoryPair;

/// A persisted extraction prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: i64,
    pub domain: String,
    pub category: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl PromptRecord {
    pub fn pair(&self) -> DomainCategoryPair {
        DomainCategoryPair::new(&self.domain, &self.category)
    }
}

//! Prompt Repository Port
//!
//! Abstract interface for extraction prompt persistence.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, DomainCategoryPair, PromptRecord};

/// Repository interface for prompt records
#[async_trait]
pub trait PromptRepository: Send + Sync {
    /// Fetch prompts by id, skipping ids that don't exist
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<PromptRecord>, DomainError>;

    /// Fetch the prompt stored for a pair
    async fn find_by_pair(
        &self,
        pair: &DomainCategoryPair,
    ) -> Result<Option<PromptRecord>, DomainError>;

    /// Every distinct pair that has a stored prompt
    async fn find_known_pairs(&self) -> Result<Vec<DomainCategoryPair>, DomainError>;

    /// Insert a new prompt, returning its generated id
    async fn insert(&self, pair: &DomainCategoryPair, text: &str) -> Result<i64, DomainError>;

    /// Number of stored prompts
    async fn count(&self) -> Result<i64, DomainError>;
}

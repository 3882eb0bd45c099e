//! DomainCategoryPair - Unit of prompt specialization

use serde::{Deserialize, Serialize};

/// A (domain, category) classification tuple.
///
/// Equality is exact and case-sensitive on both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainCategoryPair {
    pub domain: String,
    pub category: String,
}

impl DomainCategoryPair {
    pub fn new(domain: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            category: category.into(),
        }
    }
}

impl std::fmt::Display for DomainCategoryPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.domain, self.category)
    }
}

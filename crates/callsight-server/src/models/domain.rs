//! Known domain/category pairs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Known pairs grouped by domain
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DomainsResponse {
    /// domain -> categories, both sorted
    pub domains: BTreeMap<String, Vec<String>>,
    pub total_pairs: usize,
}

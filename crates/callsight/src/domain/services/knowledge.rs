//! Domain Knowledge - Registry of known (domain, category) pairs
//!
//! Seeded at startup from storage plus a static default set, then grown as
//! new pairs are discovered. Never shrinks. Shared by handle between
//! concurrent requests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};

use crate::domain::entities::DomainCategoryPair;

/// Pairs every deployment knows about, even with an empty database.
pub const DEFAULT_PAIRS: &[(&str, &str)] = &[
    ("healthcare", "appointment_scheduling"),
    ("healthcare", "billing_inquiry"),
    ("healthcare", "prescription_refill"),
    ("insurance", "claim_inquiry"),
    ("insurance", "policy_inquiry"),
    ("insurance", "premium_payment"),
];

/// Concurrent set of known pairs, grouped by domain.
///
/// Inserts happen under the write lock, so a pair is either fully visible
/// or not at all, and any `is_known` issued after `learn` returns sees it.
#[derive(Debug, Default)]
pub struct DomainKnowledge {
    pairs: RwLock<BTreeMap<String, BTreeSet<String>>>,
}

impl DomainKnowledge {
    /// Empty registry. Use [`DomainKnowledge::with_defaults`] in production.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only [`DEFAULT_PAIRS`].
    pub fn with_defaults() -> Self {
        let knowledge = Self::new();
        knowledge.seed(
            DEFAULT_PAIRS
                .iter()
                .map(|(domain, category)| DomainCategoryPair::new(*domain, *category)),
        );
        knowledge
    }

    /// Merge persisted pairs into the registry. Returns how many were new.
    pub fn seed<I>(&self, pairs: I) -> usize
    where
        I: IntoIterator<Item = DomainCategoryPair>,
    {
        let mut guard = self.pairs.write().unwrap_or_else(PoisonError::into_inner);
        let mut added = 0;
        for pair in pairs {
            if guard.entry(pair.domain).or_default().insert(pair.category) {
                added += 1;
            }
        }
        added
    }

    pub fn is_known(&self, pair: &DomainCategoryPair) -> bool {
        let guard = self.pairs.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(&pair.domain)
            .is_some_and(|categories| categories.contains(&pair.category))
    }

    /// Idempotent insert. Returns `true` if the pair was not known before.
    pub fn learn(&self, pair: &DomainCategoryPair) -> bool {
        let mut guard = self.pairs.write().unwrap_or_else(PoisonError::into_inner);
        let inserted = guard
            .entry(pair.domain.clone())
            .or_default()
            .insert(pair.category.clone());
        drop(guard);

        if inserted {
            tracing::info!("✨ New pair discovered: {}", pair);
        }
        inserted
    }

    /// Snapshot of every known pair, ordered by domain then category.
    pub fn pairs(&self) -> Vec<DomainCategoryPair> {
        let guard = self.pairs.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .iter()
            .flat_map(|(domain, categories)| {
                categories
                    .iter()
                    .map(move |category| DomainCategoryPair::new(domain, category))
            })
            .collect()
    }

    /// Snapshot grouped by domain.
    pub fn grouped(&self) -> BTreeMap<String, Vec<String>> {
        let guard = self.pairs.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .iter()
            .map(|(domain, categories)| (domain.clone(), categories.iter().cloned().collect()))
            .collect()
    }

    pub fn len(&self) -> usize {
        let guard = self.pairs.read().unwrap_or_else(PoisonError::into_inner);
        guard.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the registry as classification guidance, one line per domain:
    /// `for <domain>: <category>, <category>`.
    pub fn render_guidance(&self) -> String {
        self.grouped()
            .iter()
            .map(|(domain, categories)| format!("for {}: {}\n", domain, categories.join(", ")))
            .collect()
    }
}

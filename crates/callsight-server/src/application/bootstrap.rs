//! Startup seeding of the knowledge registry

use callsight::{DomainKnowledge, PromptRepository};

use super::gateway::Gateway;

/// Merge the pairs that already have stored prompts into `knowledge`.
///
/// A storage failure leaves the registry on its defaults; the service
/// still starts.
pub async fn seed_knowledge<P: PromptRepository>(
    knowledge: &DomainKnowledge,
    prompts: &P,
    gateway: &Gateway,
) -> usize {
    match gateway
        .storage("find_known_pairs", move || prompts.find_known_pairs())
        .await
    {
        Ok(pairs) => {
            let added = knowledge.seed(pairs);
            tracing::info!(
                "📚 Knowledge seeded: {} pairs ({} from storage)",
                knowledge.len(),
                added
            );
            added
        }
        Err(e) => {
            tracing::warn!(
                "⚠️  Could not load stored pairs, starting with defaults only: {}",
                e
            );
            0
        }
    }
}

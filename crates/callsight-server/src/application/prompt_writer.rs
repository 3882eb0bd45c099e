//! Prompt Writer - Background persistence of generated prompts
//!
//! Requests hand newly generated prompts to a bounded queue and move on.
//! A single worker drains the queue into the prompt repository. When the
//! queue is full the prompt is dropped with a warning; the pair is already
//! in the knowledge registry, so a later request for it falls back instead
//! of regenerating.

use std::sync::Arc;

use callsight::{DomainCategoryPair, PromptRepository};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::gateway::Gateway;

/// Queue capacity used when none is configured
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug)]
struct PendingPrompt {
    pair: DomainCategoryPair,
    text: String,
}

/// Handle for submitting prompts. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PromptWriter {
    sender: mpsc::Sender<PendingPrompt>,
}

impl PromptWriter {
    /// Start the worker (runs in background until every handle is dropped)
    pub fn spawn<P>(prompts: Arc<P>, gateway: Gateway, capacity: usize) -> (Self, JoinHandle<()>)
    where
        P: PromptRepository + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run(receiver, prompts, gateway));
        tracing::info!("📝 Prompt writer started (capacity: {})", capacity.max(1));
        (Self { sender }, handle)
    }

    /// Queue a prompt for persistence without waiting for it.
    ///
    /// Returns `false` if the prompt was dropped.
    pub fn submit(&self, pair: &DomainCategoryPair, text: &str) -> bool {
        let pending = PendingPrompt {
            pair: pair.clone(),
            text: text.to_string(),
        };
        match self.sender.try_send(pending) {
            Ok(()) => true,
            Err(TrySendError::Full(p)) => {
                tracing::warn!("⚠️  Prompt queue full, dropping prompt for {}", p.pair);
                false
            }
            Err(TrySendError::Closed(p)) => {
                tracing::warn!("⚠️  Prompt writer stopped, dropping prompt for {}", p.pair);
                false
            }
        }
    }
}

async fn run<P>(mut receiver: mpsc::Receiver<PendingPrompt>, prompts: Arc<P>, gateway: Gateway)
where
    P: PromptRepository + 'static,
{
    while let Some(pending) = receiver.recv().await {
        let repo = &prompts;
        let job = &pending;
        let result = gateway
            .storage("insert_prompt", move || repo.insert(&job.pair, &job.text))
            .await;

        match result {
            Ok(id) => tracing::info!("💾 Prompt saved for {} (id: {})", pending.pair, id),
            Err(e) => tracing::error!("❌ Failed to save prompt for {}: {}", pending.pair, e),
        }
    }
    tracing::info!("📝 Prompt writer stopped");
}

//! Persistence Coordinator - Two-step write of a processed call
//!
//! The call record goes first; its id keys the domain-specific payload and
//! the tonal analysis. There is no rollback: a call record without a payload
//! is a valid state and is reported as such.
//!
//! The call record insert is attempted once. A retry after a timeout could
//! store the same call twice.

use std::sync::Arc;

use callsight::{CallRepository, NewCallRecord, NewTonalAnalysis};
use serde_json::Value;

use super::gateway::{Gateway, GatewayError};

/// Result of a commit whose call record was stored
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    pub call_id: i64,
    pub domain_specific_saved: bool,
    /// Why the payload was not stored, if it wasn't
    pub domain_specific_error: Option<String>,
}

pub struct PersistenceCoordinator<C: CallRepository> {
    calls: Arc<C>,
    gateway: Gateway,
}

impl<C: CallRepository> PersistenceCoordinator<C> {
    pub fn new(calls: Arc<C>, gateway: Gateway) -> Self {
        Self { calls, gateway }
    }

    /// Store the call record, then its domain-specific payload.
    ///
    /// Fails only if the call record itself could not be stored, in which
    /// case the payload insert is never attempted.
    pub async fn commit(
        &self,
        record: &NewCallRecord,
        payload: &Value,
    ) -> Result<CommitOutcome, GatewayError> {
        let calls = &self.calls;
        let call_id = self
            .gateway
            .storage_once("insert_call", move || calls.insert_call(record))
            .await?;

        let result = self
            .gateway
            .storage("insert_domain_specific", move || {
                calls.insert_domain_specific(call_id, payload)
            })
            .await;

        match result {
            Ok(row_id) => {
                tracing::info!("💾 Call {} saved (domain_specific: {})", call_id, row_id);
                Ok(CommitOutcome {
                    call_id,
                    domain_specific_saved: true,
                    domain_specific_error: None,
                })
            }
            Err(e) => {
                tracing::error!(
                    "❌ Call {} saved without domain-specific data: {}",
                    call_id,
                    e
                );
                Ok(CommitOutcome {
                    call_id,
                    domain_specific_saved: false,
                    domain_specific_error: Some(e.to_string()),
                })
            }
        }
    }

    /// Store a tonal analysis. Returns whether it was stored.
    pub async fn save_tonal(&self, analysis: &NewTonalAnalysis) -> bool {
        let calls = &self.calls;
        match self
            .gateway
            .storage("insert_tonal_analysis", move || {
                calls.insert_tonal_analysis(analysis)
            })
            .await
        {
            Ok(row_id) => {
                tracing::info!("💾 Tonal analysis {} saved for {}", row_id, analysis.file_name);
                true
            }
            Err(e) => {
                tracing::error!(
                    "❌ Tonal analysis not saved for {}: {}",
                    analysis.file_name,
                    e
                );
                false
            }
        }
    }
}

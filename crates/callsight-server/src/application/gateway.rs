//! External Gateway
//!
//! Uniform wrapper around every outbound call to the inference backend or
//! storage: per-call timeout, bounded retries on transient failures and
//! exponential back-off (`base * 2^attempt`). Non-idempotent inserts use
//! [`Gateway::storage_once`] instead. It never looks at response
//! bodies; classifying a failure as transient is the adapter's job.

use std::future::Future;
use std::time::Duration;

use callsight::DomainError;
use thiserror::Error;

/// Retry and timeout policy for outbound calls
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Total attempts per call, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every further retry
    pub backoff_base: Duration,
    /// Timeout applied to each inference attempt
    pub inference_timeout: Duration,
    /// Timeout applied to each storage attempt
    pub storage_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            inference_timeout: Duration::from_secs(60),
            storage_timeout: Duration::from_secs(30),
        }
    }
}

/// Terminal failure of an outbound call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client-side failure, not retried
    #[error("{target} rejected: {source}")]
    Rejected {
        target: String,
        #[source]
        source: DomainError,
    },

    /// Every attempt failed transiently
    #[error("{target} failed after {attempts} attempts: {last_cause}")]
    Exhausted {
        target: String,
        attempts: u32,
        #[source]
        last_cause: DomainError,
    },
}

/// Outbound call executor
#[derive(Debug, Clone, Default)]
pub struct Gateway {
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Delay slept after failed attempt number `attempt` (zero-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.config
            .backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op` under the inference timeout
    pub async fn inference<T, F, Fut>(&self, target: &str, op: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        self.call(target, self.config.inference_timeout, op).await
    }

    /// Run `op` under the storage timeout
    pub async fn storage<T, F, Fut>(&self, target: &str, op: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        self.call(target, self.config.storage_timeout, op).await
    }

    /// Run `op` exactly once under the storage timeout.
    ///
    /// For inserts that must not be repeated: a timed-out attempt may still
    /// have committed, so a retry could write the row twice.
    pub async fn storage_once<T, F, Fut>(&self, target: &str, op: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        self.run(target, self.config.storage_timeout, 1, op).await
    }

    /// Run `op` until it succeeds, fails non-transiently, or runs out of
    /// attempts. Each attempt is bounded by `timeout`; expiry counts as a
    /// transient failure.
    pub async fn call<T, F, Fut>(
        &self,
        target: &str,
        timeout: Duration,
        op: F,
    ) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        self.run(target, timeout, self.config.max_attempts, op).await
    }

    async fn run<T, F, Fut>(
        &self,
        target: &str,
        timeout: Duration,
        max_attempts: u32,
        mut op: F,
    ) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let max_attempts = max_attempts.max(1);
        let mut last_cause = None;

        for attempt in 0..max_attempts {
            let cause = match tokio::time::timeout(timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if !e.is_transient() => {
                    tracing::warn!("⛔ {} rejected: {}", target, e);
                    return Err(GatewayError::Rejected {
                        target: target.to_string(),
                        source: e,
                    });
                }
                Ok(Err(e)) => e,
                Err(_) => DomainError::Timeout(format!("{} exceeded {:?}", target, timeout)),
            };

            if attempt + 1 < max_attempts {
                let delay = self.backoff_delay(attempt);
                tracing::warn!(
                    "⚠️  {} failed (attempt {}/{}), retrying in {:?}: {}",
                    target,
                    attempt + 1,
                    max_attempts,
                    delay,
                    cause
                );
                tokio::time::sleep(delay).await;
            } else {
                tracing::warn!(
                    "❌ {} failed after {} attempts: {}",
                    target,
                    max_attempts,
                    cause
                );
            }
            last_cause = Some(cause);
        }

        Err(GatewayError::Exhausted {
            target: target.to_string(),
            attempts: max_attempts,
            last_cause: last_cause
                .unwrap_or_else(|| DomainError::ExternalService(target.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_gateway() -> Gateway {
        Gateway::new(GatewayConfig {
            max_attempts: 3,
            backoff_base: Duration::from_millis(1),
            inference_timeout: Duration::from_millis(200),
            storage_timeout: Duration::from_millis(200),
        })
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let gateway = fast_gateway();
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        let result = gateway
            .inference("stage1", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(DomainError::Unavailable("503".into()))
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_after_all_attempts() {
        let gateway = fast_gateway();
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        let result: Result<(), _> = gateway
            .storage("insert_call", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::RateLimited("429".into()))
            })
            .await;

        match result {
            Err(GatewayError::Exhausted {
                attempts: n,
                last_cause,
                ..
            }) => {
                assert_eq!(n, 3);
                assert!(matches!(last_cause, DomainError::RateLimited(_)));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let gateway = fast_gateway();
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        let result: Result<(), _> = gateway
            .inference("stage2", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::Validation("unsupported audio".into()))
            })
            .await;

        assert!(matches!(result, Err(GatewayError::Rejected { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_transient() {
        let gateway = fast_gateway();
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        let result = gateway
            .call("slow", Duration::from_millis(10), move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                Ok::<_, DomainError>("done")
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_storage_once_does_not_retry() {
        let gateway = fast_gateway();
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        let result: Result<(), _> = gateway
            .storage_once("insert_call", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::Timeout("statement timeout".into()))
            })
            .await;

        assert!(matches!(
            result,
            Err(GatewayError::Exhausted { attempts: 1, .. })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles() {
        let gateway = Gateway::default();
        assert_eq!(gateway.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(gateway.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(gateway.backoff_delay(2), Duration::from_secs(4));
    }
}

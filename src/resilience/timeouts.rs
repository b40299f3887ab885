//! Deadline enforcement for provider calls.
//!
//! # Responsibilities
//! - Bound how long a provider call may suspend
//! - Keep quick queries and user-approval prompts on separate deadlines
//!
//! # Design Decisions
//! - Off unless configured; an undecorated provider may block forever
//! - An elapsed deadline is a `ProviderError::Timeout`, which each caller
//!   folds into its own error class
//! - Event subscriptions are never bounded

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::timeout;

use crate::network::AddChainParameters;
use crate::provider::types::{ProviderError, ProviderEvent, WalletProvider};

/// Per-class deadlines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadlines {
    /// For calls answered without user interaction (`net_version`).
    pub query: Option<Duration>,
    /// For calls that may wait on a wallet prompt.
    pub approval: Option<Duration>,
}

impl Deadlines {
    pub fn from_secs(query_secs: Option<u64>, approval_secs: Option<u64>) -> Self {
        Self {
            query: query_secs.map(Duration::from_secs),
            approval: approval_secs.map(Duration::from_secs),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.query.is_none() && self.approval.is_none()
    }
}

/// Run `fut`, failing with `Timeout` if `deadline` elapses first.
pub async fn with_deadline<T, F>(
    method: &'static str,
    deadline: Option<Duration>,
    fut: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    let Some(after) = deadline else {
        return fut.await;
    };
    match timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(method, timeout_ms = after.as_millis() as u64, "Provider call timed out");
            Err(ProviderError::Timeout { method, after })
        }
    }
}

/// Wraps a provider and applies [`Deadlines`] to each call.
pub struct DeadlineProvider {
    inner: Arc<dyn WalletProvider>,
    deadlines: Deadlines,
}

impl DeadlineProvider {
    pub fn new(inner: Arc<dyn WalletProvider>, deadlines: Deadlines) -> Self {
        Self { inner, deadlines }
    }

    /// Wrap only when at least one deadline is set.
    pub fn wrap(inner: Arc<dyn WalletProvider>, deadlines: Deadlines) -> Arc<dyn WalletProvider> {
        if deadlines.is_unbounded() {
            inner
        } else {
            Arc::new(Self::new(inner, deadlines))
        }
    }
}

#[async_trait]
impl WalletProvider for DeadlineProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        with_deadline("eth_requestAccounts", self.deadlines.approval, self.inner.request_accounts()).await
    }

    async fn network_id(&self) -> Result<u64, ProviderError> {
        with_deadline("net_version", self.deadlines.query, self.inner.network_id()).await
    }

    async fn add_chain(&self, params: &AddChainParameters) -> Result<(), ProviderError> {
        with_deadline("wallet_addEthereumChain", self.deadlines.approval, self.inner.add_chain(params)).await
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ProviderError> {
        with_deadline(
            "eth_sendTransaction",
            self.deadlines.approval,
            self.inner.send_transaction(request),
        )
        .await
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;

    #[tokio::test]
    async fn test_hung_query_times_out() {
        let provider = DeadlineProvider::new(
            Arc::new(MockProvider::new().hanging()),
            Deadlines {
                query: Some(Duration::from_millis(20)),
                approval: None,
            },
        );
        let err = provider.network_id().await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout { method: "net_version", .. }));
    }

    #[tokio::test]
    async fn test_answered_calls_pass_through() {
        let provider = DeadlineProvider::new(
            Arc::new(MockProvider::new().with_network_id(4)),
            Deadlines::from_secs(Some(5), Some(5)),
        );
        assert_eq!(provider.network_id().await.unwrap(), 4);
    }

    #[test]
    fn test_wrap_skips_unbounded() {
        assert!(Deadlines::default().is_unbounded());
        assert!(!Deadlines::from_secs(None, Some(30)).is_unbounded());
    }
}

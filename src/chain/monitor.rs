//! Active-network tracking.
//!
//! # State Transitions
//! ```text
//! Unknown → Known(id): first successful query or chainChanged event
//! Known(id) → Known(id'): any later query or event
//! ```
//!
//! # Design Decisions
//! - Queries and pushed events may race; each observation gets a sequence
//!   number on arrival and the latest arrival wins
//! - A failed query leaves the last observation in place
//! - No retry policy; failures go back to the caller

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::chain::codec::decode_chain_id;
use crate::chain::types::{ActiveChain, ChainObservation, ObservationSource};
use crate::error::{DappError, DappResult};
use crate::observability::metrics;
use crate::provider::events::pump_events;
use crate::provider::{InjectedProvider, ProviderEvent};

type ChainHandler = Arc<dyn Fn(ChainObservation) + Send + Sync>;

/// Handle returned by [`ChainMonitor::subscribe_to_chain_changes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Tracks which network the wallet is on.
pub struct ChainMonitor {
    provider: Arc<InjectedProvider>,
    state: watch::Sender<ActiveChain>,
    handlers: Mutex<Vec<(SubscriptionId, ChainHandler)>>,
    next_subscription: AtomicU64,
}

impl ChainMonitor {
    pub fn new(provider: Arc<InjectedProvider>) -> Self {
        let (state, _) = watch::channel(ActiveChain::Unknown);
        Self {
            provider,
            state,
            handlers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Last observation; may be stale.
    pub fn active_chain(&self) -> ActiveChain {
        *self.state.borrow()
    }

    /// Receiver that sees every new observation, whatever its source.
    pub fn watch(&self) -> watch::Receiver<ActiveChain> {
        self.state.subscribe()
    }

    /// Ask the wallet which network it is on.
    pub async fn query_active_chain(&self) -> DappResult<u64> {
        let provider = self.provider.get()?;
        match provider.network_id().await {
            Ok(chain_id) => {
                metrics::record_provider_request("net_version", true);
                let observation = self.record(chain_id, ObservationSource::Query);
                tracing::debug!(chain_id, seq = observation.seq, "Active chain queried");
                Ok(chain_id)
            }
            Err(e) => {
                metrics::record_provider_request("net_version", false);
                tracing::warn!(error = %e, "Active chain query failed");
                Err(DappError::ChainQueryFailed(e.to_string()))
            }
        }
    }

    /// Apply a `chainChanged` payload and notify handlers.
    ///
    /// Malformed payloads are logged and dropped; the state is untouched.
    pub fn observe_chain_changed(&self, raw: &[u8]) -> Option<ChainObservation> {
        let chain_id = match decode_chain_id(raw) {
            Ok(chain_id) => chain_id,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring undecodable chainChanged payload");
                return None;
            }
        };

        let observation = self.record(chain_id, ObservationSource::Event);
        tracing::info!(chain_id, seq = observation.seq, "Wallet switched chain");

        let handlers: Vec<ChainHandler> = self
            .handlers
            .lock()
            .expect("chain handler mutex poisoned")
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(observation);
        }
        Some(observation)
    }

    /// Call `handler` for every `chainChanged` notification.
    pub fn subscribe_to_chain_changes<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(ChainObservation) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .lock()
            .expect("chain handler mutex poisoned")
            .push((id, Arc::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock().expect("chain handler mutex poisoned");
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Follow `chainChanged` notifications until `shutdown` fires.
    pub fn spawn_chain_listener(
        self: &Arc<Self>,
        shutdown: broadcast::Receiver<()>,
    ) -> DappResult<JoinHandle<()>> {
        let events = self.provider.get()?.subscribe();
        let monitor = Arc::clone(self);

        Ok(tokio::spawn(pump_events("chain", events, shutdown, move |event| {
            if let ProviderEvent::ChainChanged(raw) = event {
                monitor.observe_chain_changed(&raw);
            }
        })))
    }

    fn record(&self, chain_id: u64, source: ObservationSource) -> ChainObservation {
        let mut observation = ChainObservation {
            chain_id,
            seq: 0,
            source,
        };
        self.state.send_modify(|state| {
            observation.seq = state.seq() + 1;
            *state = ActiveChain::Known(observation);
        });
        metrics::record_chain_observation(source.as_str(), chain_id);
        observation
    }
}

impl std::fmt::Debug for ChainMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainMonitor")
            .field("active_chain", &self.active_chain())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::registry::PALM_TESTNET;
    use crate::provider::MockProvider;

    fn monitor_with(mock: Arc<MockProvider>) -> ChainMonitor {
        ChainMonitor::new(Arc::new(InjectedProvider::new(mock)))
    }

    #[tokio::test]
    async fn test_unknown_until_first_query() {
        let monitor = monitor_with(Arc::new(MockProvider::new().with_network_id(4)));
        assert_eq!(monitor.active_chain(), ActiveChain::Unknown);

        assert_eq!(monitor.query_active_chain().await, Ok(4));
        assert_eq!(monitor.active_chain().chain_id(), Some(4));
        assert_eq!(monitor.active_chain().seq(), 1);
    }

    #[tokio::test]
    async fn test_event_bytes_decode_to_integer() {
        let monitor = monitor_with(Arc::new(MockProvider::new()));

        let observation = monitor
            .observe_chain_changed(&[0x02, 0xa1, 0x5c, 0x30, 0x83])
            .unwrap();
        assert_eq!(observation.chain_id, PALM_TESTNET);
        assert_eq!(observation.source, ObservationSource::Event);
        assert_eq!(monitor.active_chain().chain_id(), Some(PALM_TESTNET));
    }

    #[tokio::test]
    async fn test_latest_arrival_wins() {
        let mock = Arc::new(MockProvider::new().with_network_id(1));
        let monitor = monitor_with(mock);

        monitor.query_active_chain().await.unwrap();
        monitor.observe_chain_changed(&[0x04]);
        let ActiveChain::Known(latest) = monitor.active_chain() else {
            panic!("chain should be known");
        };
        assert_eq!(latest.chain_id, 4);
        assert_eq!(latest.seq, 2);

        monitor.query_active_chain().await.unwrap();
        let ActiveChain::Known(latest) = monitor.active_chain() else {
            panic!("chain should be known");
        };
        assert_eq!(latest.chain_id, 1);
        assert_eq!(latest.seq, 3);
        assert_eq!(latest.source, ObservationSource::Query);
    }

    #[tokio::test]
    async fn test_failed_query_keeps_stale_value() {
        let mock = Arc::new(MockProvider::new().with_network_id(4));
        let monitor = monitor_with(mock.clone());
        monitor.query_active_chain().await.unwrap();

        mock.set_failing_network_query(true);
        let err = monitor.query_active_chain().await.unwrap_err();
        assert!(matches!(err, DappError::ChainQueryFailed(_)));
        assert_eq!(monitor.active_chain().chain_id(), Some(4));
    }

    #[tokio::test]
    async fn test_no_provider() {
        let monitor = ChainMonitor::new(Arc::new(InjectedProvider::empty()));
        assert_eq!(monitor.query_active_chain().await, Err(DappError::ProviderUnavailable));
    }

    #[test]
    fn test_malformed_event_is_ignored() {
        let monitor = ChainMonitor::new(Arc::new(InjectedProvider::empty()));
        assert!(monitor.observe_chain_changed(&[]).is_none());
        assert!(monitor.observe_chain_changed(&[1; 9]).is_none());
        assert_eq!(monitor.active_chain(), ActiveChain::Unknown);
    }

    #[test]
    fn test_handlers_and_unsubscribe() {
        let monitor = ChainMonitor::new(Arc::new(InjectedProvider::empty()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let id = monitor.subscribe_to_chain_changes(move |observation| {
            sink.lock().unwrap().push(observation.chain_id);
        });

        monitor.observe_chain_changed(&[0x01]);
        assert!(monitor.unsubscribe(id));
        assert!(!monitor.unsubscribe(id));
        monitor.observe_chain_changed(&[0x04]);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_watch_sees_updates() {
        let monitor = monitor_with(Arc::new(MockProvider::new().with_network_id(4)));
        let mut receiver = monitor.watch();

        monitor.query_active_chain().await.unwrap();
        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow().chain_id(), Some(4));
    }
}

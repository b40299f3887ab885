//! Composition root.
//!
//! Owns one provider slot, one wallet session, one chain monitor and one
//! contract gateway, and wires them together. The presentation layer talks
//! to this type only.

use std::sync::Arc;

use alloy::primitives::Address;
use serde::Serialize;
use url::Url;

use crate::chain::ChainMonitor;
use crate::config::AppConfig;
use crate::contract::ContractGateway;
use crate::error::{DappError, DappResult};
use crate::lifecycle::Shutdown;
use crate::network::registry::describe_supported_chain;
use crate::network::ChainDescriptor;
use crate::provider::{BridgeProvider, InjectedProvider, WalletProvider};
use crate::resilience::{DeadlineProvider, Deadlines};
use crate::wallet::{SigningIdentity, WalletSession};

/// Outcome of [`Dapp::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainStatus {
    /// Already on the onboarding chain.
    OnTarget { chain_id: u64 },
    /// The chain was registered and the wallet is now on it.
    Registered { chain_id: u64 },
    /// Registration went through but the wallet stayed elsewhere.
    Mismatch { active: u64, target: u64 },
}

pub struct Dapp {
    provider: Arc<InjectedProvider>,
    bridge: Option<BridgeProvider>,
    session: Arc<WalletSession>,
    monitor: Arc<ChainMonitor>,
    gateway: ContractGateway,
    onboarding: ChainDescriptor,
}

impl Dapp {
    pub fn new(provider: Arc<InjectedProvider>, contract: Address, onboarding: ChainDescriptor) -> Self {
        let session = Arc::new(WalletSession::new(Arc::clone(&provider)));
        let monitor = Arc::new(ChainMonitor::new(Arc::clone(&provider)));
        let gateway = ContractGateway::new(contract, Arc::clone(&session));
        Self {
            provider,
            bridge: None,
            session,
            monitor,
            gateway,
            onboarding,
        }
    }

    /// Build from validated configuration.
    pub fn from_config(config: &AppConfig) -> DappResult<Self> {
        let contract: Address = config
            .contract
            .address
            .parse()
            .map_err(|e| DappError::Config(format!("invalid contract address: {}", e)))?;

        let mut onboarding = describe_supported_chain(config.onboarding.chain_id).ok_or_else(|| {
            DappError::Config(format!("chain {} is not in the registry", config.onboarding.chain_id))
        })?;
        if !config.onboarding.rpc_urls.is_empty() {
            onboarding = onboarding.with_rpc_urls(config.onboarding.rpc_urls.clone());
        }

        let Some(bridge_url) = &config.provider.bridge_url else {
            tracing::info!("No wallet bridge configured");
            return Ok(Self::new(Arc::new(InjectedProvider::empty()), contract, onboarding));
        };

        let rpc_url: Url = bridge_url
            .parse()
            .map_err(|e| DappError::Config(format!("invalid bridge URL '{}': {}", bridge_url, e)))?;
        let events_url = config
            .provider
            .events_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| DappError::Config(format!("invalid events URL: {}", e)))?;

        let bridge = BridgeProvider::new(rpc_url, events_url)
            .map_err(|e| DappError::Config(e.to_string()))?;
        let deadlines = Deadlines::from_secs(
            config.provider.query_timeout_secs,
            config.provider.approval_timeout_secs,
        );
        let provider: Arc<dyn WalletProvider> =
            DeadlineProvider::wrap(Arc::new(bridge.clone()), deadlines);

        let mut dapp = Self::new(Arc::new(InjectedProvider::new(provider)), contract, onboarding);
        dapp.bridge = Some(bridge);
        Ok(dapp)
    }

    pub fn provider(&self) -> &Arc<InjectedProvider> {
        &self.provider
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    pub fn monitor(&self) -> &Arc<ChainMonitor> {
        &self.monitor
    }

    pub fn contract(&self) -> &ContractGateway {
        &self.gateway
    }

    pub fn onboarding(&self) -> &ChainDescriptor {
        &self.onboarding
    }

    pub async fn connect(&self) -> DappResult<SigningIdentity> {
        self.session.request_connection().await
    }

    pub async fn detect_chain(&self) -> DappResult<u64> {
        self.monitor.query_active_chain().await
    }

    /// Register the onboarding chain, then re-read the active chain.
    pub async fn add_onboarding_chain(&self) -> DappResult<u64> {
        self.session.register_chain(&self.onboarding).await?;
        self.monitor.query_active_chain().await
    }

    /// Make sure the wallet is on the onboarding chain, registering it if not.
    pub async fn reconcile(&self) -> DappResult<ChainStatus> {
        let target = self.onboarding.chain_id();
        let active = self.monitor.query_active_chain().await?;
        if active == target {
            return Ok(ChainStatus::OnTarget { chain_id: active });
        }

        tracing::info!(active, target, "Wallet is not on the onboarding chain");
        let active = self.add_onboarding_chain().await?;
        if active == target {
            Ok(ChainStatus::Registered { chain_id: active })
        } else {
            Ok(ChainStatus::Mismatch { active, target })
        }
    }

    /// The wallet bridge, when one is configured.
    pub fn bridge(&self) -> Option<&BridgeProvider> {
        self.bridge.as_ref()
    }

    /// Start every notification listener, tracked by `shutdown`.
    ///
    /// Fails if the bridge event stream cannot be opened; no listener is
    /// left running in that case.
    pub async fn spawn_listeners(&self, shutdown: &mut Shutdown) -> DappResult<()> {
        let chain = self.monitor.spawn_chain_listener(shutdown.subscribe())?;
        let accounts = match self.session.spawn_account_listener(shutdown.subscribe()) {
            Ok(handle) => handle,
            Err(e) => {
                chain.abort();
                return Err(e);
            }
        };

        if let Some(bridge) = &self.bridge {
            match bridge.start_event_listener(shutdown.subscribe()).await {
                Ok(Some(handle)) => shutdown.track("bridge-events", handle),
                Ok(None) => {}
                Err(e) => {
                    chain.abort();
                    accounts.abort();
                    return Err(DappError::ConnectionFailed(e.to_string()));
                }
            }
        }

        shutdown.track("chain", chain);
        shutdown.track("accounts", accounts);
        Ok(())
    }
}

impl std::fmt::Debug for Dapp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dapp")
            .field("session", &self.session)
            .field("monitor", &self.monitor)
            .field("contract", &self.gateway.address())
            .field("onboarding", &self.onboarding.chain_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::registry::PALM_TESTNET;
    use crate::provider::{EventStreamState, MockProvider};

    fn dapp_with(mock: Arc<MockProvider>) -> Dapp {
        Dapp::new(
            Arc::new(InjectedProvider::new(mock)),
            Address::with_last_byte(0xc0),
            describe_supported_chain(PALM_TESTNET).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_reconcile_on_target() {
        let dapp = dapp_with(Arc::new(MockProvider::new().with_network_id(PALM_TESTNET)));
        assert_eq!(
            dapp.reconcile().await,
            Ok(ChainStatus::OnTarget { chain_id: PALM_TESTNET })
        );
    }

    #[tokio::test]
    async fn test_reconcile_registers_missing_chain() {
        let mock = Arc::new(MockProvider::new());
        let dapp = dapp_with(mock.clone());

        assert_eq!(
            dapp.reconcile().await,
            Ok(ChainStatus::Registered { chain_id: PALM_TESTNET })
        );
        assert_eq!(mock.added_chains().len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_reports_mismatch() {
        // Chain already known to the wallet, so adding it does not switch.
        let mock = Arc::new(MockProvider::new().with_network_id(PALM_TESTNET));
        mock.set_network_id(1);
        let dapp = dapp_with(mock);

        assert_eq!(
            dapp.reconcile().await,
            Ok(ChainStatus::Mismatch { active: 1, target: PALM_TESTNET })
        );
    }

    #[tokio::test]
    async fn test_rejected_registration_propagates() {
        let dapp = dapp_with(Arc::new(MockProvider::new().rejecting_registration()));
        assert!(matches!(
            dapp.reconcile().await,
            Err(DappError::RegistrationRejected(_))
        ));
    }

    #[test]
    fn test_from_default_config_has_no_provider() {
        let dapp = Dapp::from_config(&AppConfig::default()).unwrap();
        assert!(!dapp.session().is_provider_available());
        assert_eq!(dapp.onboarding().chain_id(), PALM_TESTNET);
    }

    #[test]
    fn test_from_config_with_bridge_and_rpc_override() {
        let mut config = AppConfig::default();
        config.provider.bridge_url = Some("http://127.0.0.1:8545".into());
        config.provider.query_timeout_secs = Some(5);
        config.onboarding.rpc_urls = vec!["https://palm.example/rpc".into()];

        let dapp = Dapp::from_config(&config).unwrap();
        assert!(dapp.session().is_provider_available());
        assert_eq!(dapp.onboarding().rpc_urls(), ["https://palm.example/rpc".to_string()]);
    }

    #[tokio::test]
    async fn test_spawn_listeners_without_provider() {
        let dapp = Dapp::from_config(&AppConfig::default()).unwrap();
        let mut shutdown = Shutdown::new();
        assert_eq!(
            dapp.spawn_listeners(&mut shutdown).await.err(),
            Some(DappError::ProviderUnavailable)
        );
        assert_eq!(shutdown.task_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_event_stream_fails_startup() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = AppConfig::default();
        config.provider.bridge_url = Some(format!("http://{}", addr));
        config.provider.events_url = Some(format!("ws://{}", addr));
        let dapp = Dapp::from_config(&config).unwrap();

        let mut shutdown = Shutdown::new();
        let err = dapp.spawn_listeners(&mut shutdown).await.unwrap_err();
        assert!(matches!(err, DappError::ConnectionFailed(_)));
        assert_eq!(shutdown.task_count(), 0);
        assert_eq!(
            *dapp.bridge().unwrap().event_stream_state().borrow(),
            EventStreamState::Stopped
        );
    }
}

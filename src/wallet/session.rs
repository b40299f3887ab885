//! Wallet session: the signing-identity lifecycle.
//!
//! # Responsibilities
//! - Request account access and adopt the first authorized account
//! - Register chain descriptors with the wallet
//! - Follow `accountsChanged` so a granted identity tracks the wallet
//!
//! # Design Decisions
//! - Sole writer of the identity; everyone else reads a snapshot
//! - Only an account-access grant activates an identity; notifications can
//!   move or clear it but never create one
//! - Writes are serialized through the change channel's lock
//! - Nothing is persisted beyond the process

use std::sync::Arc;

use alloy::primitives::Address;
use arc_swap::ArcSwap;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::error::{DappError, DappResult};
use crate::network::ChainDescriptor;
use crate::observability::metrics;
use crate::provider::events::pump_events;
use crate::provider::{InjectedProvider, ProviderEvent, WalletProvider};
use crate::wallet::types::SigningIdentity;

/// Owns the active signing identity.
pub struct WalletSession {
    provider: Arc<InjectedProvider>,
    identity: ArcSwap<SigningIdentity>,
    changes: watch::Sender<SigningIdentity>,
}

impl WalletSession {
    pub fn new(provider: Arc<InjectedProvider>) -> Self {
        let (changes, _) = watch::channel(SigningIdentity::disconnected());
        Self {
            provider,
            identity: ArcSwap::from_pointee(SigningIdentity::disconnected()),
            changes,
        }
    }

    pub fn is_provider_available(&self) -> bool {
        self.provider.is_available()
    }

    /// The injected provider, or `ProviderUnavailable`.
    pub fn provider(&self) -> DappResult<Arc<dyn WalletProvider>> {
        self.provider.get()
    }

    /// Snapshot of the identity. It may change right after this returns.
    pub fn identity(&self) -> SigningIdentity {
        **self.identity.load()
    }

    pub fn current_address(&self) -> Option<Address> {
        self.identity().address
    }

    /// Receiver that sees every identity change.
    pub fn watch(&self) -> watch::Receiver<SigningIdentity> {
        self.changes.subscribe()
    }

    /// Ask the wallet for account access and adopt the first account.
    ///
    /// Always goes back to the wallet, even when already connected, since the
    /// selected account may have changed behind our back.
    pub async fn request_connection(&self) -> DappResult<SigningIdentity> {
        let provider = self.provider.get()?;
        tracing::debug!("Requesting account access");

        let accounts = match provider.request_accounts().await {
            Ok(accounts) => {
                metrics::record_provider_request("eth_requestAccounts", true);
                accounts
            }
            Err(e) => {
                metrics::record_provider_request("eth_requestAccounts", false);
                tracing::warn!(error = %e, "Account access request failed");
                return Err(DappError::ConnectionFailed(e.to_string()));
            }
        };

        match accounts.first() {
            Some(address) => {
                self.adopt(*address);
                Ok(self.identity())
            }
            None => {
                self.clear("wallet authorized no accounts");
                Err(DappError::NoActiveIdentity)
            }
        }
    }

    /// Ask the wallet to add `descriptor` as a network.
    ///
    /// Success does not mean the wallet switched to it; query the chain
    /// monitor afterwards.
    pub async fn register_chain(&self, descriptor: &ChainDescriptor) -> DappResult<()> {
        let provider = self.provider.get()?;
        descriptor
            .validate()
            .map_err(|e| DappError::RegistrationRejected(e.to_string()))?;

        let payload = descriptor.to_registration_payload();
        tracing::info!(
            chain_id = %payload.chain_id,
            chain_name = %payload.chain_name,
            "Registering chain with wallet"
        );

        match provider.add_chain(&payload).await {
            Ok(()) => {
                metrics::record_provider_request("wallet_addEthereumChain", true);
                Ok(())
            }
            Err(e) => {
                metrics::record_provider_request("wallet_addEthereumChain", false);
                tracing::warn!(chain_id = %payload.chain_id, error = %e, "Chain registration rejected");
                Err(DappError::RegistrationRejected(e.to_string()))
            }
        }
    }

    /// Forget the active account.
    pub fn disconnect(&self) {
        self.clear("explicit disconnect");
    }

    /// Apply an `accountsChanged` notification.
    ///
    /// A non-empty list only moves an identity that is already active; the
    /// wallet must grant access through `request_connection` first.
    pub fn observe_accounts(&self, accounts: &[Address]) {
        let Some(address) = accounts.first().copied() else {
            self.clear("wallet reported no accounts");
            return;
        };

        let (previous, next) = self.update(|current| {
            if current.is_active() {
                SigningIdentity::connected(address)
            } else {
                current
            }
        });
        if !previous.is_active() {
            tracing::debug!(address = %address, "Ignoring accountsChanged without a granted connection");
        } else if previous != next {
            tracing::info!(address = %address, "Wallet switched signing account");
        }
    }

    /// Follow `accountsChanged` notifications until `shutdown` fires.
    pub fn spawn_account_listener(
        self: &Arc<Self>,
        shutdown: broadcast::Receiver<()>,
    ) -> DappResult<JoinHandle<()>> {
        let events = self.provider.get()?.subscribe();
        let session = Arc::clone(self);

        Ok(tokio::spawn(pump_events(
            "accounts",
            events,
            shutdown,
            move |event| {
                if let ProviderEvent::AccountsChanged(accounts) = event {
                    session.observe_accounts(&accounts);
                }
            },
        )))
    }

    fn adopt(&self, address: Address) {
        let (previous, _) = self.update(|_| SigningIdentity::connected(address));
        if previous.address != Some(address) {
            tracing::info!(address = %address, "Signing identity active");
        }
    }

    fn clear(&self, reason: &'static str) {
        let (previous, _) = self.update(|_| SigningIdentity::disconnected());
        if previous.is_active() {
            tracing::info!(reason, "Signing identity cleared");
        }
    }

    /// Replace the identity with `f(current)`, publishing it if it changed.
    /// Returns the previous and the new identity.
    fn update<F>(&self, f: F) -> (SigningIdentity, SigningIdentity)
    where
        F: FnOnce(SigningIdentity) -> SigningIdentity,
    {
        let mut previous = SigningIdentity::disconnected();
        let mut next = previous;
        self.changes.send_if_modified(|published| {
            previous = **self.identity.load();
            next = f(previous);
            self.identity.store(Arc::new(next));
            *published = next;
            previous != next
        });
        (previous, next)
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("provider", &self.provider)
            .field("identity", &self.identity())
            .finish()
    }
}

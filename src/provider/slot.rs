//! The place a wallet provider is injected into.

use std::sync::{Arc, RwLock};

use crate::error::{DappError, DappResult};
use crate::provider::types::WalletProvider;

/// Holds the injected provider, if any.
///
/// Shared by the session, the monitor, and the gateway so that injecting or
/// removing a wallet is seen by all of them at once.
#[derive(Default)]
pub struct InjectedProvider {
    inner: RwLock<Option<Arc<dyn WalletProvider>>>,
}

impl InjectedProvider {
    /// An environment without a wallet.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            inner: RwLock::new(Some(provider)),
        }
    }

    pub fn inject(&self, provider: Arc<dyn WalletProvider>) {
        *self.inner.write().expect("provider slot lock poisoned") = Some(provider);
        tracing::info!("Wallet provider injected");
    }

    pub fn eject(&self) -> Option<Arc<dyn WalletProvider>> {
        let previous = self.inner.write().expect("provider slot lock poisoned").take();
        if previous.is_some() {
            tracing::info!("Wallet provider removed");
        }
        previous
    }

    pub fn is_available(&self) -> bool {
        self.inner.read().expect("provider slot lock poisoned").is_some()
    }

    /// The current provider or `ProviderUnavailable`.
    pub fn get(&self) -> DappResult<Arc<dyn WalletProvider>> {
        self.inner
            .read()
            .expect("provider slot lock poisoned")
            .clone()
            .ok_or(DappError::ProviderUnavailable)
    }
}

impl std::fmt::Debug for InjectedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectedProvider")
            .field("available", &self.is_available())
            .finish()
    }
}

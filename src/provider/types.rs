//! Wallet provider capability set and boundary types.

use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::network::AddChainParameters;

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Notifications pushed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Network switched; the chain id arrives as raw bytes.
    ChainChanged(Bytes),
    /// Authorized accounts changed; empty means the wallet disconnected us.
    AccountsChanged(Vec<Address>),
}

/// Failures at the provider boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    /// Error object returned by the wallet.
    #[error("provider error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// The provider could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with something unexpected.
    #[error("malformed provider response: {0}")]
    Decode(String),

    /// A deadline elapsed before the provider answered.
    #[error("{method} timed out after {after:?}")]
    Timeout {
        method: &'static str,
        after: Duration,
    },
}

impl ProviderError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::Rpc { code, .. } if *code == USER_REJECTED_CODE)
    }
}

/// The capability set an injected wallet offers.
///
/// Every call may suspend until the wallet answers, including while the user
/// is looking at an approval prompt.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// `net_version`, normalised to an integer.
    async fn network_id(&self) -> Result<u64, ProviderError>;

    /// `wallet_addEthereumChain`.
    async fn add_chain(&self, params: &AddChainParameters) -> Result<(), ProviderError>;

    /// `eth_sendTransaction`. Resolves once the wallet accepts the request for
    /// broadcast, not when it is mined.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ProviderError>;

    /// Receive pushed notifications from now on.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

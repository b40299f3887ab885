//! Scriptable in-memory wallet provider.
//!
//! Behaves like a browser wallet that auto-approves prompts unless told
//! otherwise, records every request it receives, and lets callers push
//! `chainChanged` / `accountsChanged` notifications.

use std::collections::HashSet;
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::chain::codec::parse_chain_id;
use crate::network::AddChainParameters;
use crate::provider::types::{ProviderError, ProviderEvent, WalletProvider, USER_REJECTED_CODE};

#[derive(Debug)]
struct MockState {
    accounts: Vec<Address>,
    network_id: u64,
    known_chains: HashSet<u64>,
    reject_connection: bool,
    reject_registration: bool,
    fail_network_query: bool,
    revert_reason: Option<String>,
    hang: bool,
    account_requests: usize,
    added_chains: Vec<AddChainParameters>,
    sent: Vec<TransactionRequest>,
}

/// In-memory [`WalletProvider`].
#[derive(Debug)]
pub struct MockProvider {
    state: Mutex<MockState>,
    events: broadcast::Sender<ProviderEvent>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// A wallet on Ethereum Mainnet with no accounts.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            state: Mutex::new(MockState {
                accounts: Vec::new(),
                network_id: 1,
                known_chains: HashSet::from([1, 4]),
                reject_connection: false,
                reject_registration: false,
                fail_network_query: false,
                revert_reason: None,
                hang: false,
                account_requests: 0,
                added_chains: Vec::new(),
                sent: Vec::new(),
            }),
            events,
        }
    }

    pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
        self.lock().accounts = accounts;
        self
    }

    pub fn with_network_id(self, network_id: u64) -> Self {
        {
            let mut state = self.lock();
            state.network_id = network_id;
            state.known_chains.insert(network_id);
        }
        self
    }

    /// Decline every `eth_requestAccounts` prompt.
    pub fn rejecting_connection(self) -> Self {
        self.lock().reject_connection = true;
        self
    }

    /// Decline every `wallet_addEthereumChain` prompt.
    pub fn rejecting_registration(self) -> Self {
        self.lock().reject_registration = true;
        self
    }

    /// Revert every transaction with `reason`.
    pub fn reverting(self, reason: impl Into<String>) -> Self {
        self.lock().revert_reason = Some(reason.into());
        self
    }

    /// Never answer any request.
    pub fn hanging(self) -> Self {
        self.lock().hang = true;
        self
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.lock().accounts = accounts;
    }

    pub fn set_network_id(&self, network_id: u64) {
        self.lock().network_id = network_id;
    }

    pub fn set_failing_network_query(&self, failing: bool) {
        self.lock().fail_network_query = failing;
    }

    /// Push a `chainChanged` notification carrying `raw` as the chain id.
    pub fn emit_chain_changed(&self, raw: impl Into<Bytes>) {
        let _ = self.events.send(ProviderEvent::ChainChanged(raw.into()));
    }

    /// Push an `accountsChanged` notification.
    pub fn emit_accounts_changed(&self, accounts: Vec<Address>) {
        self.lock().accounts = accounts.clone();
        let _ = self.events.send(ProviderEvent::AccountsChanged(accounts));
    }

    /// How many times `eth_requestAccounts` was called.
    pub fn account_requests(&self) -> usize {
        self.lock().account_requests
    }

    pub fn added_chains(&self) -> Vec<AddChainParameters> {
        self.lock().added_chains.clone()
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.lock().sent.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock provider mutex poisoned")
    }

    async fn stall_if_hanging(&self) {
        let hang = self.lock().hang;
        if hang {
            std::future::pending::<()>().await;
        }
    }
}

fn user_rejected() -> ProviderError {
    ProviderError::Rpc {
        code: USER_REJECTED_CODE,
        message: "User rejected the request.".to_string(),
        data: None,
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.stall_if_hanging().await;
        let mut state = self.lock();
        state.account_requests += 1;
        if state.reject_connection {
            return Err(user_rejected());
        }
        Ok(state.accounts.clone())
    }

    async fn network_id(&self) -> Result<u64, ProviderError> {
        self.stall_if_hanging().await;
        let state = self.lock();
        if state.fail_network_query {
            return Err(ProviderError::Transport("connection reset".to_string()));
        }
        Ok(state.network_id)
    }

    async fn add_chain(&self, params: &AddChainParameters) -> Result<(), ProviderError> {
        self.stall_if_hanging().await;
        let chain_id = parse_chain_id(&params.chain_id).map_err(|e| ProviderError::Rpc {
            code: -32602,
            message: e.to_string(),
            data: None,
        })?;

        let switched = {
            let mut state = self.lock();
            if state.reject_registration {
                return Err(user_rejected());
            }
            state.added_chains.push(params.clone());
            // An already-known chain is accepted silently, like a real wallet.
            let newly_added = state.known_chains.insert(chain_id);
            if newly_added && state.network_id != chain_id {
                state.network_id = chain_id;
                true
            } else {
                false
            }
        };

        if switched {
            let raw = chain_id.to_be_bytes();
            let start = raw.iter().position(|b| *b != 0).unwrap_or(7);
            let _ = self
                .events
                .send(ProviderEvent::ChainChanged(Bytes::copy_from_slice(&raw[start..])));
        }
        Ok(())
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ProviderError> {
        self.stall_if_hanging().await;
        let mut state = self.lock();
        if let Some(reason) = &state.revert_reason {
            return Err(ProviderError::Rpc {
                code: -32603,
                message: format!("execution reverted: {}", reason),
                data: None,
            });
        }
        state.sent.push(request);
        Ok(TxHash::from(U256::from(state.sent.len())))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::registry::{describe_supported_chain, PALM_TESTNET};

    #[tokio::test]
    async fn test_add_chain_switches_and_emits() {
        let provider = MockProvider::new();
        let mut events = provider.subscribe();
        let payload = describe_supported_chain(PALM_TESTNET)
            .unwrap()
            .to_registration_payload();

        provider.add_chain(&payload).await.unwrap();
        assert_eq!(provider.network_id().await.unwrap(), PALM_TESTNET);

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            ProviderEvent::ChainChanged(Bytes::from(vec![0x02, 0xa1, 0x5c, 0x30, 0x83]))
        );
    }

    #[tokio::test]
    async fn test_transaction_hashes_stay_unique() {
        let provider = MockProvider::new();
        let mut hashes = HashSet::new();
        for _ in 0..300 {
            let hash = provider
                .send_transaction(TransactionRequest::default())
                .await
                .unwrap();
            assert!(hashes.insert(hash), "duplicate hash {}", hash);
        }
        assert_eq!(provider.sent_transactions().len(), 300);
    }

    #[tokio::test]
    async fn test_known_chain_is_benign() {
        let provider = MockProvider::new().with_network_id(PALM_TESTNET);
        let payload = describe_supported_chain(PALM_TESTNET)
            .unwrap()
            .to_registration_payload();

        assert!(provider.add_chain(&payload).await.is_ok());
        assert!(provider.add_chain(&payload).await.is_ok());
        assert_eq!(provider.added_chains().len(), 2);
    }
}

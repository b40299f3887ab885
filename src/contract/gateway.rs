//! Typed wrappers around the contract's state-changing methods.
//!
//! # Responsibilities
//! - Encode calldata from domain arguments
//! - Tag each request with the current signing identity
//! - Hand the request to the wallet and return the pending hash
//!
//! # Design Decisions
//! - The identity is read at dispatch time, never cached
//! - No role pre-checks and no receipt polling; the contract decides

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::sol_types::SolCall;

use crate::contract::bindings::CasablancaParis;
use crate::contract::types::{ContractBinding, ContractMethod, TransactionHandle};
use crate::error::{DappError, DappResult};
use crate::observability::metrics;
use crate::wallet::WalletSession;

/// Dispatches contract calls from the session's active account.
#[derive(Debug, Clone)]
pub struct ContractGateway {
    address: Address,
    session: Arc<WalletSession>,
}

impl ContractGateway {
    pub fn new(address: Address, session: Arc<WalletSession>) -> Self {
        Self { address, session }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Current binding; the signer follows the session.
    pub fn binding(&self) -> ContractBinding {
        ContractBinding {
            address: self.address,
            signer: self.session.identity(),
        }
    }

    /// `mint(tokenURI, redeemable)`. The URI format is left to the contract.
    pub async fn mint(&self, token_uri: &str, redeemable: bool) -> DappResult<TransactionHandle> {
        let call = CasablancaParis::mintCall {
            tokenURI: token_uri.to_string(),
            _redeemable: redeemable,
        };
        self.dispatch(ContractMethod::Mint, call).await
    }

    /// `setVaultAddress(vault)`. Reverts unless the sender is administrator.
    pub async fn set_vault_address(&self, vault: Address) -> DappResult<TransactionHandle> {
        let call = CasablancaParis::setVaultAddressCall {
            _vaultAddress: vault,
        };
        self.dispatch(ContractMethod::SetVaultAddress, call).await
    }

    /// `setRedemption(tokenId)`. Irreversible on-chain.
    pub async fn set_redemption(&self, token_id: U256) -> DappResult<TransactionHandle> {
        let call = CasablancaParis::setRedemptionCall { tokenId: token_id };
        self.dispatch(ContractMethod::SetRedemption, call).await
    }

    async fn dispatch<C: SolCall>(
        &self,
        method: ContractMethod,
        call: C,
    ) -> DappResult<TransactionHandle> {
        let from = self
            .session
            .current_address()
            .ok_or(DappError::NoActiveIdentity)?;
        let provider = self.session.provider()?;

        let request = build_request(from, self.address, call.abi_encode());
        tracing::debug!(method = %method, from = %from, contract = %self.address, "Submitting contract call");

        match provider.send_transaction(request).await {
            Ok(hash) => {
                metrics::record_provider_request("eth_sendTransaction", true);
                metrics::record_transaction_submitted(method.as_str());
                tracing::info!(method = %method, tx_hash = %hash, from = %from, "Transaction accepted for broadcast");
                Ok(TransactionHandle {
                    hash,
                    method,
                    from,
                    contract: self.address,
                })
            }
            Err(e) => {
                metrics::record_provider_request("eth_sendTransaction", false);
                tracing::warn!(method = %method, from = %from, error = %e, "Contract call failed");
                Err(DappError::ContractCallFailed(e.to_string()))
            }
        }
    }
}

/// Transaction request carrying calldata as both `input` and `data`, since
/// wallets disagree on which field they read.
pub fn build_request(from: Address, to: Address, calldata: Vec<u8>) -> TransactionRequest {
    let mut request = TransactionRequest::default().with_from(from).with_to(to);
    request.input = TransactionInput::both(calldata.into());
    request
}

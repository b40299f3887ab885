//! Chain descriptors and the `wallet_addEthereumChain` payload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::codec::encode_chain_id_hex;

/// Native currency of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    /// Ticker, 2 to 6 characters.
    pub symbol: String,
    pub decimals: u8,
}

/// Everything a wallet needs to add a network.
///
/// Immutable once built; only ever used as a registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    chain_id: u64,
    name: String,
    native_currency: NativeCurrency,
    rpc_urls: Vec<String>,
    block_explorer_urls: Vec<String>,
}

/// Reasons a descriptor would be refused by a wallet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("currency symbol '{0}' must be 2 to 6 characters")]
    SymbolLength(String),

    #[error("at least one RPC URL is required")]
    NoRpcUrls,

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("decimals {0} out of range")]
    Decimals(u8),
}

impl ChainDescriptor {
    pub fn new(
        chain_id: u64,
        name: impl Into<String>,
        native_currency: NativeCurrency,
        rpc_urls: Vec<String>,
        block_explorer_urls: Vec<String>,
    ) -> Self {
        Self {
            chain_id,
            name: name.into(),
            native_currency,
            rpc_urls,
            block_explorer_urls,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn native_currency(&self) -> &NativeCurrency {
        &self.native_currency
    }

    pub fn rpc_urls(&self) -> &[String] {
        &self.rpc_urls
    }

    pub fn block_explorer_urls(&self) -> &[String] {
        &self.block_explorer_urls
    }

    /// Copy of this descriptor pointing at different RPC endpoints.
    pub fn with_rpc_urls(&self, rpc_urls: Vec<String>) -> Self {
        Self {
            rpc_urls,
            ..self.clone()
        }
    }

    /// Check the fields wallets are known to reject.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let symbol_len = self.native_currency.symbol.chars().count();
        if !(2..=6).contains(&symbol_len) {
            return Err(DescriptorError::SymbolLength(
                self.native_currency.symbol.clone(),
            ));
        }
        if self.native_currency.decimals > 36 {
            return Err(DescriptorError::Decimals(self.native_currency.decimals));
        }
        if self.rpc_urls.is_empty() {
            return Err(DescriptorError::NoRpcUrls);
        }
        for url in self.rpc_urls.iter().chain(&self.block_explorer_urls) {
            url::Url::parse(url).map_err(|e| DescriptorError::InvalidUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Build the exact parameter object sent with `wallet_addEthereumChain`.
    pub fn to_registration_payload(&self) -> AddChainParameters {
        AddChainParameters {
            chain_id: encode_chain_id_hex(self.chain_id),
            chain_name: self.name.clone(),
            native_currency: self.native_currency.clone(),
            rpc_urls: self.rpc_urls.clone(),
            block_explorer_urls: self.block_explorer_urls.clone(),
        }
    }
}

/// Wire form of a chain registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameters {
    /// `0x`-prefixed hexadecimal chain id.
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

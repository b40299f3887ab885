//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::contract::DEFAULT_CONTRACT_ADDRESS;
use crate::network::registry::PALM_TESTNET;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// How the wallet provider is reached.
    pub provider: ProviderConfig,

    /// Target contract.
    pub contract: ContractConfig,

    /// Chain users are onboarded onto.
    pub onboarding: OnboardingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Wallet provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProviderConfig {
    /// JSON-RPC endpoint of an EIP-1193 wallet bridge. Absent means no wallet
    /// is injected.
    pub bridge_url: Option<String>,

    /// WebSocket endpoint forwarding wallet notifications.
    pub events_url: Option<String>,

    /// Deadline for calls answered without user interaction.
    pub query_timeout_secs: Option<u64>,

    /// Deadline for calls that wait on a wallet prompt.
    pub approval_timeout_secs: Option<u64>,
}

/// Contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployed contract address (20-byte hex).
    pub address: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT_ADDRESS.to_string(),
        }
    }
}

/// Onboarding chain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OnboardingConfig {
    /// Chain id registered by `add-chain`; must be in the registry.
    pub chain_id: u64,

    /// Replaces the registry's RPC URLs when non-empty.
    pub rpc_urls: Vec<String>,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            chain_id: PALM_TESTNET,
            rpc_urls: Vec::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint (only used by `watch`).
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

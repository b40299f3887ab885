//! Static table of networks this client knows how to describe.

use crate::network::descriptor::{ChainDescriptor, NativeCurrency};

/// Ethereum Mainnet.
pub const ETHEREUM_MAINNET: u64 = 1;
/// Ethereum Testnet Rinkeby.
pub const ETHEREUM_RINKEBY: u64 = 4;
/// PALM Mainnet.
pub const PALM_MAINNET: u64 = 11_297_108_109;
/// PALM Testnet, the chain users are onboarded onto.
pub const PALM_TESTNET: u64 = 11_297_108_099;

const INFURA_PROJECT_ID: &str = "3a961d6501e54add9a41aa53f15de99b";

/// One row of the registry.
#[derive(Debug, Clone, Copy)]
pub struct KnownChain {
    pub chain_id: u64,
    /// Display label, e.g. "PALM Testnet".
    pub label: &'static str,
    /// Name sent to wallets as `chainName`.
    pub chain_name: &'static str,
    pub currency_name: &'static str,
    pub currency_symbol: &'static str,
    pub decimals: u8,
    pub rpc_host: &'static str,
    pub block_explorer: &'static str,
}

impl KnownChain {
    fn describe(&self) -> ChainDescriptor {
        ChainDescriptor::new(
            self.chain_id,
            self.chain_name,
            NativeCurrency {
                name: self.currency_name.to_string(),
                symbol: self.currency_symbol.to_string(),
                decimals: self.decimals,
            },
            vec![format!("https://{}/v3/{}", self.rpc_host, INFURA_PROJECT_ID)],
            vec![self.block_explorer.to_string()],
        )
    }
}

const KNOWN_CHAINS: [KnownChain; 4] = [
    KnownChain {
        chain_id: ETHEREUM_MAINNET,
        label: "Ethereum Mainnet",
        chain_name: "Ethereum Mainnet",
        currency_name: "Ether",
        currency_symbol: "ETH",
        decimals: 18,
        rpc_host: "mainnet.infura.io",
        block_explorer: "https://etherscan.io/",
    },
    KnownChain {
        chain_id: ETHEREUM_RINKEBY,
        label: "Ethereum Testnet Rinkeby",
        chain_name: "Rinkeby",
        currency_name: "Rinkeby Ether",
        currency_symbol: "RIN",
        decimals: 18,
        rpc_host: "rinkeby.infura.io",
        block_explorer: "https://rinkeby.etherscan.io/",
    },
    KnownChain {
        chain_id: PALM_MAINNET,
        label: "PALM Mainnet",
        chain_name: "palm",
        currency_name: "PALM",
        currency_symbol: "PALM",
        decimals: 18,
        rpc_host: "palm-mainnet.infura.io",
        block_explorer: "https://explorer.palm.io/",
    },
    KnownChain {
        chain_id: PALM_TESTNET,
        label: "PALM Testnet",
        chain_name: "palm",
        currency_name: "PALM",
        currency_symbol: "PALM",
        decimals: 18,
        rpc_host: "palm-testnet.infura.io",
        block_explorer: "https://explorer.palm-uat.xyz/",
    },
];

/// All networks in the registry, in display order.
pub fn known_chains() -> &'static [KnownChain] {
    &KNOWN_CHAINS
}

/// Look up a registrable descriptor for `chain_id`.
pub fn describe_supported_chain(chain_id: u64) -> Option<ChainDescriptor> {
    KNOWN_CHAINS
        .iter()
        .find(|chain| chain.chain_id == chain_id)
        .map(KnownChain::describe)
}

/// Display label for `chain_id`, if known.
pub fn chain_label(chain_id: u64) -> Option<&'static str> {
    KNOWN_CHAINS
        .iter()
        .find(|chain| chain.chain_id == chain_id)
        .map(|chain| chain.label)
}

//! Interface definition of the minting contract.
//!
//! Roles enforced on-chain: the administrator sets the vault address, minters
//! mint, redeemers redeem. Nothing here checks roles.

use alloy::sol;

sol! {
    /// Redeemable NFT collection minted into a configurable vault.
    #[derive(Debug, PartialEq, Eq)]
    interface CasablancaParis {
        /// Mint `tokenURI` (an `ipfs://{hash}` locator) into the vault.
        function mint(string tokenURI, bool _redeemable) external;

        /// Administrator only.
        function setVaultAddress(address _vaultAddress) external;

        /// Marks a token as redeemed. Cannot be undone.
        function setRedemption(uint256 tokenId) external;
    }
}

/// Deployed contract address.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xA0931d84d4e242C55C308C9D558588A6a7b84743";

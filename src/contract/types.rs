//! Contract binding and transaction handle types.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;

use crate::wallet::SigningIdentity;

/// The state-changing methods this client can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContractMethod {
    #[serde(rename = "mint")]
    Mint,
    #[serde(rename = "setVaultAddress")]
    SetVaultAddress,
    #[serde(rename = "setRedemption")]
    SetRedemption,
}

impl ContractMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractMethod::Mint => "mint",
            ContractMethod::SetVaultAddress => "setVaultAddress",
            ContractMethod::SetRedemption => "setRedemption",
        }
    }
}

impl std::fmt::Display for ContractMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract address paired with the identity calls would be sent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContractBinding {
    pub address: Address,
    pub signer: SigningIdentity,
}

/// A transaction the wallet accepted for broadcast. Not necessarily mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionHandle {
    pub hash: TxHash,
    pub method: ContractMethod,
    pub from: Address,
    pub contract: Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_match_abi() {
        assert_eq!(ContractMethod::Mint.to_string(), "mint");
        assert_eq!(
            serde_json::to_value(ContractMethod::SetVaultAddress).unwrap(),
            "setVaultAddress"
        );
    }
}

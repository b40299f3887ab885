//! Signing identity.

use alloy::primitives::Address;
use serde::Serialize;

/// The account every outbound transaction is sent from.
///
/// At most one address is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SigningIdentity {
    pub address: Option<Address>,
}

impl SigningIdentity {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.address.is_some()
    }
}

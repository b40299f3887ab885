//! Error taxonomy shared by the session, monitor, and gateway.

use thiserror::Error;

/// Errors surfaced to the presentation layer.
///
/// Nothing in this crate retries on its own; every variant is handed back to
/// the caller, which decides whether the user should try again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DappError {
    /// No wallet provider is injected into the environment.
    #[error("no wallet provider available; install or enable a wallet")]
    ProviderUnavailable,

    /// The provider refused or failed the account-access request.
    #[error("wallet connection failed: {0}")]
    ConnectionFailed(String),

    /// The user or the provider declined the chain descriptor.
    #[error("chain registration rejected: {0}")]
    RegistrationRejected(String),

    /// The active network could not be read.
    #[error("chain query failed: {0}")]
    ChainQueryFailed(String),

    /// A contract call was attempted without a connected account.
    #[error("no active signing identity; connect a wallet first")]
    NoActiveIdentity,

    /// The contract or the provider rejected the transaction.
    #[error("contract call failed: {0}")]
    ContractCallFailed(String),

    /// The composition root could not be assembled.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DappError {
    /// Whether the user can reasonably try the same action again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DappError::ConnectionFailed(_)
                | DappError::RegistrationRejected(_)
                | DappError::ChainQueryFailed(_)
                | DappError::ContractCallFailed(_)
        )
    }
}

/// Result type for session, monitor, and gateway operations.
pub type DappResult<T> = Result<T, DappError>;

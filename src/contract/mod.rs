//! Contract gateway subsystem.
//!
//! # Data Flow
//! ```text
//! UI intent (mint / setVaultAddress / setRedemption)
//!     → gateway.rs (identity check, sol! calldata)
//!     → TransactionRequest { from: identity, to: contract }
//!     → WalletProvider::send_transaction
//!     → TransactionHandle (pending hash)
//! ```
//!
//! # Design Decisions
//! - "Success" means accepted for broadcast, not mined
//! - Contract-side rejections surface as `ContractCallFailed`

pub mod bindings;
pub mod gateway;
pub mod types;

pub use bindings::{CasablancaParis, DEFAULT_CONTRACT_ADDRESS};
pub use gateway::ContractGateway;
pub use types::{ContractBinding, ContractMethod, TransactionHandle};

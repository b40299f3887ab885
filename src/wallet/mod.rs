//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! connect request
//!     → session.rs (eth_requestAccounts via the injected provider)
//!     → SigningIdentity (first account, or cleared)
//!     → read by the contract gateway on every call
//!
//! accountsChanged notifications
//!     → session.rs listener → SigningIdentity (only once granted)
//! ```
//!
//! # Design Decisions
//! - Single writer (the session), many readers
//! - Identity swapped atomically; readers re-validate before use

pub mod session;
pub mod types;

pub use session::WalletSession;
pub use types::SigningIdentity;

//! Wallet provider boundary.
//!
//! # Data Flow
//! ```text
//! Wallet (browser extension / bridge)
//!     → bridge.rs (JSON-RPC over HTTP, events over WebSocket)
//!     → WalletProvider trait (types.rs)
//!     → slot.rs (InjectedProvider: present or absent)
//!     → session, monitor, gateway
//! ```
//!
//! # Design Decisions
//! - The provider is an external collaborator; only its interface lives here
//! - Pushed notifications are a broadcast channel, one receiver per listener
//!   (events.rs pumps them until shutdown)
//! - `mock.rs` implements the same trait for tests and demos

pub mod bridge;
pub mod events;
pub mod mock;
pub mod slot;
pub mod types;

pub use bridge::{BridgeProvider, EventStreamState};
pub use mock::MockProvider;
pub use slot::InjectedProvider;
pub use types::{ProviderError, ProviderEvent, WalletProvider};

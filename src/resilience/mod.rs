//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Session / monitor / gateway call:
//!     → timeouts.rs (optional per-class deadline around the provider)
//!     → WalletProvider
//!
//! Bridge event stream drop:
//!     → backoff.rs (delay before the next reconnect attempt)
//! ```
//!
//! # Design Decisions
//! - No automatic retries of wallet requests; every failure goes back to the caller
//! - Only the bridge event stream reconnects on its own
//! - Deadlines are opt-in and composable as a provider decorator

pub mod backoff;
pub mod timeouts;

pub use backoff::Backoff;
pub use timeouts::{DeadlineProvider, Deadlines};

//! Lifecycle management for long-running commands.
//!
//! # Data Flow
//! ```text
//! watch command:
//!     spawn listeners (bridge events, chain, accounts) → Shutdown::track
//!     signals.rs: SIGINT/SIGTERM → Shutdown::drain → listeners exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

//! Chain awareness subsystem.
//!
//! # Data Flow
//! ```text
//! net_version query ─────┐
//!                        ├→ monitor.rs (sequence on arrival) → ActiveChain
//! chainChanged (bytes) ──┘       │
//!      → codec.rs (bytes → u64)  └→ handlers, watch receivers
//! ```
//!
//! # Design Decisions
//! - One integer representation for chain ids everywhere
//! - Read lazily; only provider events push

pub mod codec;
pub mod monitor;
pub mod types;

pub use monitor::{ChainMonitor, SubscriptionId};
pub use types::{ActiveChain, ChainObservation, ObservationSource};

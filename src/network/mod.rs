//! Network registry subsystem.
//!
//! # Data Flow
//! ```text
//! registry.rs (static table of known chains)
//!     → descriptor.rs (ChainDescriptor, validated)
//!     → AddChainParameters (camelCase wire payload)
//!     → WalletSession::register_chain
//! ```
//!
//! # Design Decisions
//! - Pure data and lookup; no I/O and no failure besides "not found"
//! - Descriptors are immutable; overrides build a new descriptor

pub mod descriptor;
pub mod registry;

pub use descriptor::{AddChainParameters, ChainDescriptor, DescriptorError, NativeCurrency};
pub use registry::{describe_supported_chain, known_chains, KnownChain, PALM_TESTNET};

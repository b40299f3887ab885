//! Wallet session manager and contract-call dispatcher for the PALM NFT
//! minting contract.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────── Dapp ────────────────────────────┐
//!   connect ─────▶│ WalletSession ──▶ SigningIdentity ──┐                        │
//!   add-chain ───▶│      │ register_chain               ▼                        │
//!   chain ───────▶│ ChainMonitor ◀── chainChanged   ContractGateway ◀── mint /   │
//!                 │      │                               │          setVault /  │
//!                 │      ▼                               ▼          redeem      │
//!                 │           InjectedProvider (WalletProvider)                 │
//!                 └────────────────────────────┬─────────────────────────────────┘
//!                                              ▼
//!                               wallet bridge / MockProvider
//! ```

pub mod chain;
pub mod config;
pub mod contract;
pub mod dapp;
pub mod error;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod provider;
pub mod resilience;
pub mod wallet;

pub use config::AppConfig;
pub use dapp::{ChainStatus, Dapp};
pub use error::{DappError, DappResult};

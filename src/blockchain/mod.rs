//! Tezos operation pipeline.
//!
//! # Data Flow
//! ```text
//! OperationRequest[] + Wallet (address, public key)
//!     → context.rs (counter, branch, reveal status; concurrent)
//!     → normalizer.rs (reveal, counters, defaults, balance probe)
//!     → estimator.rs (run_operation, limits, fee)
//!     → forger.rs (wire bytes)
//!     → wallet.rs (watermarked ed25519 signature)
//!     → broadcast.rs (injection, operation hash)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables or host entropy
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Nothing is signed before simulation succeeded for the whole batch

pub mod broadcast;
pub mod client;
pub mod constants;
pub mod context;
pub mod decimal;
pub mod encoding;
pub mod estimator;
pub mod forger;
pub mod normalizer;
pub mod operation;
pub mod simulation;
pub mod transaction;
pub mod types;
pub mod wallet;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{NodeClient, TezosRpc};
pub use forger::Forger;
pub use operation::{Operation, OperationKind, OperationRequest};
pub use transaction::{OperationPipeline, PreparedOperation};
pub use types::{TezosError, TezosResult};
pub use wallet::Wallet;

//! Tezos operation preparation, fee estimation, signing and injection.

pub mod blockchain;
pub mod config;
pub mod observability;

pub use blockchain::{NodeClient, OperationPipeline, OperationRequest, TezosError, TezosRpc, Wallet};
pub use config::OperatorConfig;

//! Chain-specific types and error definitions.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::operation::Operation;

// Re-export RpcConfig from config module to avoid duplication
pub use crate::config::schema::RpcConfig;

/// Errors that can occur while preparing, signing or submitting operations.
#[derive(Debug, Error)]
pub enum TezosError {
    /// Transport failure while talking to the node.
    #[error("Network error: {0}")]
    Network(String),

    /// A field required by the operation kind is missing.
    #[error("property \"{0}\" was not defined")]
    PropertyNotDefined(String),

    /// The operation kind is outside the supported set.
    #[error("unsupported operation type \"{0}\"")]
    UnsupportedOperationKind(String),

    /// Simulation returned a different number of results than submitted.
    #[error(
        "Run Operation did not return same number of operations. Locally we have {expected}, but got back {actual}"
    )]
    InternalOpCountMismatch { expected: usize, actual: usize },

    /// The node rejected an operation during simulation.
    #[error("The operation produced an error {0}")]
    TezosOperation(serde_json::Value),

    /// An internal operation failed during simulation.
    #[error("An internal operation produced an error {0}")]
    TezosInternal(serde_json::Value),

    /// Balance lookup failed for a reason other than an unknown account.
    #[error("Error fetching balance: {0}")]
    FetchBalance(String),

    /// Estimation was asked to cost an empty batch.
    #[error("Empty operations array")]
    NoOperation,

    /// The injection endpoint answered with something other than a hash.
    #[error("Injection rejected: {0}")]
    InjectionRejected(serde_json::Value),

    /// Invalid key material or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Malformed hex or base58 input.
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("RPC URL needs to start with https://")]
    RpcNoHttps,

    #[error("Invalid RPC URL: {0}")]
    RpcInvalidUrl(String),

    #[error("Invalid RPC response")]
    RpcInvalidResponse,
}

impl TezosError {
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn property_not_defined(property: &str) -> Self {
        Self::PropertyNotDefined(property.to_string())
    }

    pub fn unsupported_kind(kind: &str) -> Self {
        Self::UnsupportedOperationKind(kind.to_string())
    }

    pub fn op_count_mismatch(expected: usize, actual: usize) -> Self {
        Self::InternalOpCountMismatch { expected, actual }
    }

    pub fn operation(errors: &serde_json::Value) -> Self {
        Self::TezosOperation(errors.clone())
    }

    pub fn internal(errors: &serde_json::Value) -> Self {
        Self::TezosInternal(errors.clone())
    }

    pub fn fetch_balance(err: impl std::fmt::Display) -> Self {
        Self::FetchBalance(err.to_string())
    }

    pub fn encoding(err: impl std::fmt::Display) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Result type for Tezos operations.
pub type TezosResult<T> = Result<T, TezosError>;

/// Account state an operation batch is built against.
///
/// Resolved fresh for every batch: a stale counter is rejected by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainContext {
    /// Counter of the last operation the account has applied.
    pub counter: U256,
    /// Block hash the batch is anchored to.
    pub branch: String,
    /// Whether the account's public key is already on chain.
    pub is_revealed: bool,
}

/// Operation batch sharing one branch and one signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedOperation {
    pub branch: String,
    pub contents: Vec<Operation>,
}

/// Finalized batch after simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationOutcome {
    /// The batch with final gas limits, storage limits and fees.
    pub operation: WrappedOperation,
    /// Forged bytes of `operation`, hex encoded.
    pub forged: String,
    /// Gas consumed across the whole batch.
    pub gas_total: U256,
    /// Fee charged to each non-reveal operation, in mutez.
    pub fee_per_operation: Option<U256>,
}

/// Result of signing a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayload {
    /// Payload that was signed, hex encoded, without watermark.
    pub bytes: String,
    /// Signature with the generic `sig` prefix.
    pub sig: String,
    /// Signature with the curve-specific `edsig` prefix.
    pub prefix_sig: String,
    /// Payload followed by the raw signature, hex encoded.
    pub sbytes: String,
}

/// Signed operation ready for injection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOperation {
    pub signature: SignedPayload,
}

/// Public identity of the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub curve: String,
    pub public_key: String,
    pub address: String,
}

/// Subset of the block header used for chain identification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockHeader {
    pub hash: Option<String>,
    pub chain_id: Option<String>,
    #[serde(default)]
    pub level: Option<u64>,
    #[serde(default)]
    pub protocol: Option<String>,
}

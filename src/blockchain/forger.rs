//! Serialization of operation batches to the binary wire format.
//!
//! The encoder itself is an external collaborator. [`NodeClient`] implements
//! [`Forger`] through the node's forge helper.

use async_trait::async_trait;
use serde_json::Value;

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::{TezosError, TezosResult, WrappedOperation};

const FORGE_PATH: &str = "chains/main/blocks/head/helpers/forge/operations";

#[async_trait]
pub trait Forger: Send + Sync {
    /// Hex-encoded canonical bytes of `{branch, contents}`.
    async fn forge(&self, operation: &WrappedOperation) -> TezosResult<String>;
}

#[async_trait]
impl Forger for NodeClient {
    async fn forge(&self, operation: &WrappedOperation) -> TezosResult<String> {
        let (status, body) = self.post_json(FORGE_PATH, operation).await?;

        match body {
            Value::String(forged) if status.is_success() => {
                if forged.is_empty() || hex::decode(&forged).is_err() {
                    return Err(TezosError::encoding(format!("node forged invalid hex {:?}", forged)));
                }
                tracing::debug!(bytes = forged.len() / 2, "Operation forged");
                Ok(forged)
            }
            other => {
                tracing::warn!(status = %status, "Forging failed");
                Err(TezosError::Network(format!("{} returned {}: {}", FORGE_PATH, status, other)))
            }
        }
    }
}

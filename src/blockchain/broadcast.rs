//! Injection of signed operations.

use crate::blockchain::client::TezosRpc;
use crate::blockchain::types::TezosResult;

/// Submit `signed_bytes` and return the operation hash.
///
/// No retry: a failed injection is returned to the caller unchanged.
pub async fn broadcast_transaction(rpc: &dyn TezosRpc, signed_bytes: &str) -> TezosResult<String> {
    match rpc.inject(signed_bytes).await {
        Ok(hash) => {
            tracing::info!(op_hash = %hash, bytes = signed_bytes.len() / 2, "Operation injected");
            Ok(hash)
        }
        Err(e) => {
            tracing::error!(error = %e, "Injection failed");
            Err(e)
        }
    }
}

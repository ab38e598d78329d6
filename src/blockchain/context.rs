//! Account and chain state resolution.

use alloy_primitives::U256;

use crate::blockchain::client::TezosRpc;
use crate::blockchain::types::{ChainContext, TezosResult};

/// Fetch counter, branch and reveal status of `address` concurrently.
///
/// All three must succeed: a context built from partial answers would yield
/// an inconsistent batch.
pub async fn resolve_chain_context(rpc: &dyn TezosRpc, address: &str) -> TezosResult<ChainContext> {
    let (counter, branch, manager_key) = tokio::try_join!(
        rpc.get_counter(address),
        rpc.get_branch(),
        rpc.get_manager_key(address),
    )?;

    let context = ChainContext {
        counter,
        branch,
        is_revealed: manager_key.is_some(),
    };
    tracing::debug!(
        address = %address,
        counter = %context.counter,
        branch = %context.branch,
        is_revealed = context.is_revealed,
        "Chain context resolved"
    );
    Ok(context)
}

/// Spendable balance of `address`; accounts the node does not know are empty.
pub async fn probe_balance(rpc: &dyn TezosRpc, address: &str) -> TezosResult<U256> {
    rpc.get_balance(address).await
}

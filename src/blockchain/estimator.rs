//! Gas, storage and fee estimation through node simulation.
//!
//! # Data Flow
//! ```text
//! WrappedOperation (placeholders)
//!     → simulation copy with gas capped to fit one block
//!     → forge (byte length for the fee)
//!     → run_operation (consumed milligas, storage diffs, burns)
//!     → limits overwritten, fee distributed over non-reveal operations
//!     → forge again → EstimationOutcome
//! ```
//!
//! # Design Decisions
//! - Fees are computed in nanotez so the 0.1 mutez per gas unit stays exact
//! - The fee is split evenly across non-reveal operations, not by usage
//! - The batch is not touched after the final forge

use alloy_primitives::U256;

use crate::blockchain::client::TezosRpc;
use crate::blockchain::constants::{
    DUMMY_SIGNATURE, FEE_PLACEHOLDER, FEE_SAFETY_MARGIN, GAS_LIMIT_PLACEHOLDER,
    HEX_SIGNATURE_LENGTH, MAX_GAS_PER_BLOCK, MINIMAL_FEE, MINIMAL_FEE_PER_BYTE,
    MINIMAL_NANOTEZ_PER_GAS_UNIT, NANOTEZ_PER_MUTEZ, STORAGE_LIMIT_PLACEHOLDER,
};
use crate::blockchain::decimal::ceil_div;
use crate::blockchain::forger::Forger;
use crate::blockchain::operation::Operation;
use crate::blockchain::simulation::{RunOperationRequest, SimulatedOperation};
use crate::blockchain::types::{EstimationOutcome, TezosError, TezosResult, WrappedOperation};

/// Gas limit each manager operation is simulated with.
///
/// Keeps the whole simulated batch under the block gas ceiling.
pub fn simulation_gas_limit(operation_count: usize) -> U256 {
    let cap = U256::from(MAX_GAS_PER_BLOCK) / U256::from(operation_count.max(1));
    cap.min(U256::from(GAS_LIMIT_PLACEHOLDER))
}

/// Total fee of a batch, in nanotez.
///
/// `forged_hex_len` excludes the signature; its length is added here.
pub fn total_fee_nanotez(forged_hex_len: usize, gas_total: U256) -> U256 {
    let bytes = ceil_div(
        U256::from(forged_hex_len + HEX_SIGNATURE_LENGTH),
        U256::from(2u8),
    );
    let mutez = U256::from(MINIMAL_FEE)
        + U256::from(MINIMAL_FEE_PER_BYTE) * bytes
        + U256::from(FEE_SAFETY_MARGIN);

    mutez * U256::from(NANOTEZ_PER_MUTEZ) + gas_total * U256::from(MINIMAL_NANOTEZ_PER_GAS_UNIT)
}

/// Fee charged to each of `payers` operations, in mutez, rounded up.
pub fn fee_per_operation(forged_hex_len: usize, gas_total: U256, payers: usize) -> Option<U256> {
    if payers == 0 {
        return None;
    }
    let total = total_fee_nanotez(forged_hex_len, gas_total);
    Some(ceil_div(total, U256::from(NANOTEZ_PER_MUTEZ) * U256::from(payers)))
}

fn simulation_contents(operation: &WrappedOperation) -> Vec<Operation> {
    let gas_limit = simulation_gas_limit(operation.contents.len());
    operation
        .contents
        .iter()
        .cloned()
        .map(|mut op| {
            if let Some(fields) = op.manager_mut() {
                fields.gas_limit = gas_limit;
            }
            op
        })
        .collect()
}

/// Simulate `operation`, then fill in its limits and fees.
///
/// With `override_parameters` every limit is replaced by the simulated
/// consumption and the fee is always recomputed. Otherwise only fields still
/// holding their placeholder are replaced.
pub async fn estimate_and_replace_limits_and_fee(
    rpc: &dyn TezosRpc,
    forger: &dyn Forger,
    mut operation: WrappedOperation,
    override_parameters: bool,
) -> TezosResult<EstimationOutcome> {
    if operation.contents.is_empty() {
        return Err(TezosError::NoOperation);
    }

    let request = RunOperationRequest {
        chain_id: String::new(),
        operation: SimulatedOperation {
            branch: operation.branch.clone(),
            contents: simulation_contents(&operation),
            signature: DUMMY_SIGNATURE.to_string(),
        },
    };
    let forged_len = forger.forge(&operation).await?.len();

    let header = rpc.get_header().await?;
    let chain_id = header
        .chain_id
        .ok_or_else(|| TezosError::network("block header carries no chain_id"))?;
    let request = RunOperationRequest { chain_id, ..request };

    let response = rpc.run_operation(&request).await?;
    if response.contents.len() != operation.contents.len() {
        return Err(TezosError::op_count_mismatch(
            operation.contents.len(),
            response.contents.len(),
        ));
    }

    let gas_placeholder = U256::from(GAS_LIMIT_PLACEHOLDER);
    let storage_placeholder = U256::from(STORAGE_LIMIT_PLACEHOLDER);
    let mut gas_total = U256::ZERO;

    for (op, content) in operation.contents.iter_mut().zip(&response.contents) {
        let Some(consumed) = content.metadata.total_consumption()? else {
            continue;
        };
        if let Some(fields) = op.manager_mut() {
            if override_parameters || fields.gas_limit == gas_placeholder {
                fields.gas_limit = consumed.gas;
            }
            if override_parameters || fields.storage_limit == storage_placeholder {
                fields.storage_limit = consumed.storage;
            }
        }
        gas_total += consumed.gas;
    }

    let fee_placeholder = U256::from(FEE_PLACEHOLDER);
    let needs_fee = override_parameters
        || operation
            .contents
            .iter()
            .filter_map(Operation::manager)
            .any(|fields| fields.fee == fee_placeholder);

    let mut fee = None;
    if needs_fee {
        let payers = operation.contents.iter().filter(|op| !op.is_reveal()).count();
        fee = fee_per_operation(forged_len, gas_total, payers);
        if let Some(fee) = fee {
            for op in operation.contents.iter_mut().filter(|op| !op.is_reveal()) {
                if let Some(fields) = op.manager_mut() {
                    fields.fee = fee;
                }
            }
        }
    }

    tracing::info!(
        operations = operation.contents.len(),
        gas_total = %gas_total,
        forged_bytes = forged_len / 2,
        fee_per_operation = %fee.map(|f| f.to_string()).unwrap_or_default(),
        "Operation estimated"
    );

    let forged = forger.forge(&operation).await?;
    Ok(EstimationOutcome {
        operation,
        forged,
        gas_total,
        fee_per_operation: fee,
    })
}

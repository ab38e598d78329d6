//! Operation normalization.
//!
//! # Responsibilities
//! - Prepend a reveal when the account's key is not yet on chain
//! - Assign sequential counters starting right after the account counter
//! - Fill default fee, source and kind-specific gas/storage limits
//! - Reject requests missing fields their kind requires
//!
//! # Design Decisions
//! - [`normalize_operation`] is pure; the only I/O is the balance probe for
//!   transactions to implicit accounts, done by [`normalize_operations`]
//! - Fields the caller supplied are never overwritten, so normalizing an
//!   already complete operation is the identity
//! - Passthrough kinds are copied verbatim

use alloy_primitives::U256;

use crate::blockchain::client::TezosRpc;
use crate::blockchain::constants::{
    ALLOCATION_STORAGE_LIMIT, DEFAULT_GAS_LIMIT, DEFAULT_STORAGE_LIMIT, FEE_PLACEHOLDER,
    GAS_LIMIT_PLACEHOLDER, REVEAL_FEE, REVEAL_GAS_LIMIT, REVEAL_STORAGE_LIMIT,
    STORAGE_LIMIT_PLACEHOLDER,
};
use crate::blockchain::context::probe_balance;
use crate::blockchain::encoding::is_implicit_address;
use crate::blockchain::operation::{
    Delegation, ManagerFields, ManagerOperation, ManagerRequestFields, Operation, OperationKind,
    OperationRequest, Origination, Reveal, Transaction,
};
use crate::blockchain::types::{ChainContext, TezosError, TezosResult, WrappedOperation};

/// Reveal publishing `public_key` for `address` at `counter`.
pub fn create_reveal_operation(counter: U256, public_key: &str, address: &str) -> Operation {
    Operation::Manager(ManagerOperation::Reveal(Reveal {
        manager: ManagerFields {
            source: address.to_string(),
            fee: U256::from(REVEAL_FEE),
            counter,
            gas_limit: U256::from(REVEAL_GAS_LIMIT),
            storage_limit: U256::from(REVEAL_STORAGE_LIMIT),
        },
        public_key: public_key.to_string(),
    }))
}

/// Fill the defaults of a single request.
///
/// `counter` is the value used when the request carries none.
/// `unfunded_destination` selects the allocation storage default for
/// transactions.
pub fn normalize_operation(
    request: OperationRequest,
    address: &str,
    counter: U256,
    unfunded_destination: bool,
) -> TezosResult<Operation> {
    let fill = |fields: ManagerRequestFields, gas_limit: u64, storage_limit: u64| ManagerFields {
        source: fields.source.unwrap_or_else(|| address.to_string()),
        fee: fields.fee.unwrap_or(U256::from(FEE_PLACEHOLDER)),
        counter: fields.counter.unwrap_or(counter),
        gas_limit: fields.gas_limit.unwrap_or(U256::from(gas_limit)),
        storage_limit: fields.storage_limit.unwrap_or(U256::from(storage_limit)),
    };

    let operation = match request {
        OperationRequest::Reveal(reveal) => {
            let public_key = required(reveal.public_key, "public_key")?;
            ManagerOperation::Reveal(Reveal {
                manager: fill(reveal.manager, DEFAULT_GAS_LIMIT, DEFAULT_STORAGE_LIMIT),
                public_key,
            })
        }
        OperationRequest::Delegation(delegation) => ManagerOperation::Delegation(Delegation {
            manager: fill(delegation.manager, DEFAULT_GAS_LIMIT, DEFAULT_STORAGE_LIMIT),
            delegate: delegation.delegate,
        }),
        OperationRequest::Transaction(tx) => {
            let amount = required(tx.amount, "amount")?;
            let destination = required(tx.destination, "destination")?;
            let storage_limit = if unfunded_destination && is_implicit_address(&destination) {
                ALLOCATION_STORAGE_LIMIT
            } else {
                STORAGE_LIMIT_PLACEHOLDER
            };
            ManagerOperation::Transaction(Transaction {
                manager: fill(tx.manager, GAS_LIMIT_PLACEHOLDER, storage_limit),
                amount,
                destination,
                parameters: tx.parameters,
            })
        }
        OperationRequest::Origination(origination) => {
            let balance = required(origination.balance, "balance")?;
            let script = required(origination.script, "script")?;
            ManagerOperation::Origination(Origination {
                manager: fill(origination.manager, GAS_LIMIT_PLACEHOLDER, STORAGE_LIMIT_PLACEHOLDER),
                balance,
                delegate: origination.delegate,
                script,
            })
        }
        OperationRequest::Passthrough(op) => return Ok(Operation::Passthrough(op)),
    };
    Ok(Operation::Manager(operation))
}

fn required<T>(value: Option<T>, property: &str) -> TezosResult<T> {
    value.ok_or_else(|| TezosError::property_not_defined(property))
}

/// Destination of a transaction whose storage limit has to be defaulted.
///
/// Incomplete transactions are left to [`normalize_operation`] to reject.
fn destination_to_probe(request: &OperationRequest) -> Option<&str> {
    match request {
        OperationRequest::Transaction(tx)
            if tx.manager.storage_limit.is_none() && tx.amount.is_some() =>
        {
            tx.destination
                .as_deref()
                .filter(|destination| is_implicit_address(destination))
        }
        _ => None,
    }
}

/// Build the batch for `requests` against a freshly resolved `context`.
pub async fn normalize_operations(
    rpc: &dyn TezosRpc,
    address: &str,
    public_key: &str,
    requests: Vec<OperationRequest>,
    context: &ChainContext,
) -> TezosResult<WrappedOperation> {
    let mut base = context.counter + U256::from(1u8);
    let mut contents = Vec::with_capacity(requests.len() + 1);

    let has_reveal = requests.iter().any(|r| r.kind() == OperationKind::Reveal);
    if !context.is_revealed && !has_reveal {
        tracing::info!(address = %address, counter = %base, "Account unrevealed, prepending reveal");
        contents.push(create_reveal_operation(base, public_key, address));
        base += U256::from(1u8);
    }

    for (index, request) in requests.into_iter().enumerate() {
        let unfunded_destination = match destination_to_probe(&request) {
            Some(destination) => probe_balance(rpc, destination).await?.is_zero(),
            None => false,
        };
        let counter = base + U256::from(index);
        contents.push(normalize_operation(request, address, counter, unfunded_destination)?);
    }

    Ok(WrappedOperation {
        branch: context.branch.clone(),
        contents,
    })
}

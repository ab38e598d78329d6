//! Wire types for the node's `run_operation` simulation endpoint.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::constants::{ALLOCATION_BURN, MILLIGAS_PER_GAS, ORIGINATION_BURN};
use crate::blockchain::decimal;
use crate::blockchain::operation::Operation;
use crate::blockchain::types::{TezosError, TezosResult};

/// Body posted to `run_operation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOperationRequest {
    pub chain_id: String,
    pub operation: SimulatedOperation,
}

/// A batch with a placeholder signature; the node does not check it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedOperation {
    pub branch: String,
    pub contents: Vec<Operation>,
    pub signature: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunOperationResponse {
    #[serde(default)]
    pub contents: Vec<SimulatedContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulatedContent {
    #[serde(default)]
    pub metadata: SimulationMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationMetadata {
    #[serde(default)]
    pub operation_result: Option<OperationResult>,
    #[serde(default)]
    pub internal_operation_results: Option<Vec<InternalOperationResult>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InternalOperationResult {
    #[serde(default)]
    pub result: Option<OperationResult>,
}

/// Resource consumption reported for one operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
    #[serde(default, with = "decimal::option")]
    pub consumed_milligas: Option<U256>,
    #[serde(default, with = "decimal::option")]
    pub paid_storage_size_diff: Option<U256>,
    #[serde(default)]
    pub originated_contracts: Option<Vec<String>>,
    #[serde(default)]
    pub allocated_destination_contract: Option<bool>,
}

/// Gas and storage attributed to an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Consumption {
    pub gas: U256,
    pub storage: U256,
}

impl Consumption {
    fn add(&mut self, other: Consumption) {
        self.gas += other.gas;
        self.storage += other.storage;
    }
}

impl OperationResult {
    /// Gas rounded up from milligas, storage including burns.
    pub fn consumption(&self) -> Consumption {
        let milligas = self.consumed_milligas.unwrap_or_default();
        let per_gas = U256::from(MILLIGAS_PER_GAS);
        let mut storage = self.paid_storage_size_diff.unwrap_or_default();

        if let Some(originated) = &self.originated_contracts {
            storage += U256::from(originated.len()) * U256::from(ORIGINATION_BURN);
        }
        if self.allocated_destination_contract.unwrap_or(false) {
            storage += U256::from(ALLOCATION_BURN);
        }

        Consumption {
            gas: decimal::ceil_div(milligas, per_gas),
            storage,
        }
    }

    fn errors(&self) -> Option<&Value> {
        self.errors.as_ref().filter(|e| !e.is_null())
    }
}

impl SimulationMetadata {
    /// Sum consumption of nested results, failing on the first error.
    pub fn internal_consumption(&self) -> TezosResult<Consumption> {
        let mut total = Consumption::default();
        let results = self.internal_operation_results.iter().flatten();

        for result in results.filter_map(|internal| internal.result.as_ref()) {
            if let Some(errors) = result.errors() {
                return Err(TezosError::internal(errors));
            }
            total.add(result.consumption());
        }
        Ok(total)
    }

    /// Total consumption of this operation, or `None` without an operation result.
    ///
    /// The operation's own errors are checked before any internal result.
    pub fn total_consumption(&self) -> TezosResult<Option<Consumption>> {
        let Some(result) = &self.operation_result else {
            return Ok(None);
        };
        if let Some(errors) = result.errors() {
            return Err(TezosError::operation(errors));
        }

        let mut total = self.internal_consumption()?;
        total.add(result.consumption());
        Ok(Some(total))
    }
}

//! In-memory node used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blockchain::client::TezosRpc;
use crate::blockchain::forger::Forger;
use crate::blockchain::simulation::{RunOperationRequest, RunOperationResponse};
use crate::blockchain::types::{BlockHeader, TezosError, TezosResult, WrappedOperation};

pub const BRANCH: &str = "BLbfxzLVe4Wu25Wmz3MoDWp8c6HmEwKxfR3MC86FHiK12zNp4WK";
pub const CHAIN_ID: &str = "NetXdQprcVkpaWU";
pub const OP_HASH: &str = "onvsLP3JFZia2mzZKWaFuFkWg2L5p3BDUhzh5Kr6CiDDN3rtQ1D";

pub struct MockRpc {
    counter: U256,
    is_revealed: bool,
    fail_branch: bool,
    fail_balance: bool,
    balances: HashMap<String, U256>,
    consumed_milligas: String,
    simulation: Option<Value>,
    calls: Mutex<Vec<String>>,
    simulations: Mutex<Vec<RunOperationRequest>>,
    injected: Mutex<Vec<String>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self {
            counter: U256::from(13_186_806u64),
            is_revealed: true,
            fail_branch: false,
            fail_balance: false,
            balances: HashMap::new(),
            consumed_milligas: "1000040".into(),
            simulation: None,
            calls: Mutex::new(Vec::new()),
            simulations: Mutex::new(Vec::new()),
            injected: Mutex::new(Vec::new()),
        }
    }

    pub fn revealed(mut self, is_revealed: bool) -> Self {
        self.is_revealed = is_revealed;
        self
    }

    pub fn failing_branch(mut self) -> Self {
        self.fail_branch = true;
        self
    }

    pub fn failing_balance(mut self) -> Self {
        self.fail_balance = true;
        self
    }

    pub fn with_balance(mut self, address: &str, balance: U256) -> Self {
        self.balances.insert(address.to_string(), balance);
        self
    }

    pub fn with_consumed_milligas(mut self, milligas: &str) -> Self {
        self.consumed_milligas = milligas.to_string();
        self
    }

    /// Answer every simulation with `response` verbatim.
    pub fn with_simulation(mut self, response: Value) -> Self {
        self.simulation = Some(response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn simulations(&self) -> Vec<RunOperationRequest> {
        self.simulations.lock().unwrap().clone()
    }

    pub fn injected(&self) -> Vec<String> {
        self.injected.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl TezosRpc for MockRpc {
    async fn get_counter(&self, _address: &str) -> TezosResult<U256> {
        self.record("counter");
        Ok(self.counter)
    }

    async fn get_branch(&self) -> TezosResult<String> {
        self.record("branch");
        if self.fail_branch {
            return Err(TezosError::network("connection refused"));
        }
        Ok(BRANCH.to_string())
    }

    async fn get_manager_key(&self, _address: &str) -> TezosResult<Option<String>> {
        self.record("manager_key");
        Ok(self
            .is_revealed
            .then(|| "edpkvRupRPuHmoUx2zMgbDibs4KMD6ZwqEp6PePzSwhKkQ6pVxoU3u".to_string()))
    }

    async fn get_balance(&self, address: &str) -> TezosResult<U256> {
        self.record("balance");
        if self.fail_balance {
            return Err(TezosError::FetchBalance("node returned 500".into()));
        }
        Ok(self.balances.get(address).copied().unwrap_or_default())
    }

    async fn get_header(&self) -> TezosResult<BlockHeader> {
        self.record("header");
        Ok(BlockHeader {
            hash: Some("BM9ZS9x59tNxAiZh86NKQNHcFs7WBqNpWuwKszg2mL2pYq3uP83".into()),
            chain_id: Some(CHAIN_ID.into()),
            level: Some(3_625_334),
            protocol: None,
        })
    }

    async fn run_operation(&self, request: &RunOperationRequest) -> TezosResult<RunOperationResponse> {
        self.record("run_operation");
        self.simulations.lock().unwrap().push(request.clone());

        let response = match &self.simulation {
            Some(response) => response.clone(),
            None => {
                let contents: Vec<Value> = request
                    .operation
                    .contents
                    .iter()
                    .map(|_| {
                        json!({
                            "metadata": {
                                "operation_result": {
                                    "status": "applied",
                                    "consumed_milligas": self.consumed_milligas,
                                }
                            }
                        })
                    })
                    .collect();
                json!({ "contents": contents })
            }
        };
        Ok(serde_json::from_value(response).unwrap())
    }

    async fn inject(&self, signed_bytes: &str) -> TezosResult<String> {
        self.record("inject");
        self.injected.lock().unwrap().push(signed_bytes.to_string());
        Ok(OP_HASH.to_string())
    }
}

/// Forger returning a fixed-length payload and recording its inputs.
pub struct MockForger {
    hex_len: usize,
    forged: Mutex<Vec<WrappedOperation>>,
}

impl MockForger {
    pub fn new(hex_len: usize) -> Self {
        Self {
            hex_len,
            forged: Mutex::new(Vec::new()),
        }
    }

    pub fn forged(&self) -> Vec<WrappedOperation> {
        self.forged.lock().unwrap().clone()
    }
}

#[async_trait]
impl Forger for MockForger {
    async fn forge(&self, operation: &WrappedOperation) -> TezosResult<String> {
        self.forged.lock().unwrap().push(operation.clone());
        Ok("a".repeat(self.hex_len))
    }
}

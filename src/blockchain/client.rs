//! Tezos node RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Query account state (counter, manager key, balance) and chain state (branch, header)
//! - Submit batches to the simulation and injection endpoints
//! - Map transport and status failures onto [`TezosError`]
//! - Validate candidate node URLs before they are persisted

use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::blockchain::decimal;
use crate::blockchain::simulation::{RunOperationRequest, RunOperationResponse};
use crate::blockchain::types::{BlockHeader, RpcConfig, TezosError, TezosResult};
use crate::config::validation::normalize_node_url;

/// Node interface the pipeline stages are handed.
///
/// Every method is a single request: retries and caching are left to callers.
#[async_trait]
pub trait TezosRpc: Send + Sync {
    /// Counter of the last operation applied for `address`.
    async fn get_counter(&self, address: &str) -> TezosResult<U256>;

    /// Hash of the block two levels below head.
    async fn get_branch(&self) -> TezosResult<String>;

    /// Revealed public key of `address`, `None` when unrevealed.
    async fn get_manager_key(&self, address: &str) -> TezosResult<Option<String>>;

    /// Spendable balance in mutez. Unknown accounts report zero.
    async fn get_balance(&self, address: &str) -> TezosResult<U256>;

    async fn get_header(&self) -> TezosResult<BlockHeader>;

    async fn run_operation(&self, request: &RunOperationRequest) -> TezosResult<RunOperationResponse>;

    /// Inject signed bytes and return the operation hash.
    async fn inject(&self, signed_bytes: &str) -> TezosResult<String>;
}

/// reqwest-backed [`TezosRpc`] for a single node.
#[derive(Clone)]
pub struct NodeClient {
    http: Client,
    base_url: String,
    timeout_duration: Duration,
}

impl NodeClient {
    /// Create a client for the node configured in `config`.
    pub fn new(config: &RpcConfig) -> TezosResult<Self> {
        Self::with_url(&config.node_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_url(node_url: &str, timeout_duration: Duration) -> TezosResult<Self> {
        let http = Client::builder()
            .timeout(timeout_duration)
            .build()
            .map_err(TezosError::network)?;

        let client = Self {
            http,
            base_url: normalize_node_url(node_url),
            timeout_duration,
        };
        tracing::debug!(node_url = %client.base_url, "Node client initialized");
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that `node_url` points at a live node before it is persisted.
    ///
    /// Returns the normalized URL and the header the node answered with.
    pub async fn check_node(
        node_url: &str,
        timeout_duration: Duration,
    ) -> TezosResult<(String, BlockHeader)> {
        if !node_url.starts_with("https://") {
            return Err(TezosError::RpcNoHttps);
        }
        url::Url::parse(node_url).map_err(|e| TezosError::RpcInvalidUrl(e.to_string()))?;

        let client = Self::with_url(node_url, timeout_duration)?;
        let header: Value = client
            .get_json("chains/main/blocks/head/header")
            .await
            .map_err(|e| TezosError::RpcInvalidUrl(e.to_string()))?;
        let header = validate_header(header)?;

        tracing::info!(
            node_url = %client.base_url,
            chain_id = header.chain_id.as_deref().unwrap_or_default(),
            protocol = header.protocol.as_deref().unwrap_or_default(),
            level = header.level.unwrap_or_default(),
            "Node URL verified"
        );
        Ok((client.base_url, header))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> TezosResult<T> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| self.transport_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            tracing::warn!(path = %path, status = %status, "Node returned an error status");
            return Err(TezosError::Network(format!("{} returned {}: {}", path, status, body)));
        }
        response.json().await.map_err(TezosError::network)
    }

    /// POST a JSON body and return the raw status with the decoded JSON reply.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> TezosResult<(StatusCode, Value)> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(path, e))?;

        let status = response.status();
        let text = response.text().await.map_err(TezosError::network)?;
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok((status, value))
    }

    fn transport_error(&self, path: &str, err: reqwest::Error) -> TezosError {
        if err.is_timeout() {
            tracing::warn!(path = %path, timeout_secs = self.timeout_duration.as_secs(), "RPC timeout");
        } else {
            tracing::warn!(path = %path, error = %err, "RPC error");
        }
        TezosError::network(err)
    }
}

#[async_trait]
impl TezosRpc for NodeClient {
    async fn get_counter(&self, address: &str) -> TezosResult<U256> {
        let path = format!("chains/main/blocks/head/context/contracts/{}/counter", address);
        let counter: Value = self.get_json(&path).await?;
        parse_amount(&counter).ok_or_else(|| TezosError::Network(format!("invalid counter {}", counter)))
    }

    async fn get_branch(&self) -> TezosResult<String> {
        self.get_json("chains/main/blocks/head~2/hash").await
    }

    async fn get_manager_key(&self, address: &str) -> TezosResult<Option<String>> {
        let path = format!("chains/main/blocks/head/context/contracts/{}/manager_key", address);
        self.get_json(&path).await
    }

    async fn get_balance(&self, address: &str) -> TezosResult<U256> {
        let path = format!("chains/main/blocks/head/context/contracts/{}/balance", address);
        let response = self
            .http
            .get(self.url(&path))
            .send()
            .await
            .map_err(TezosError::fetch_balance)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!(address = %address, "Account not found, assuming empty balance");
                Ok(U256::ZERO)
            }
            status if status.is_success() => {
                let balance: Value = response.json().await.map_err(TezosError::fetch_balance)?;
                parse_amount(&balance)
                    .ok_or_else(|| TezosError::FetchBalance(format!("invalid balance {}", balance)))
            }
            status => Err(TezosError::FetchBalance(format!("node returned {}", status))),
        }
    }

    async fn get_header(&self) -> TezosResult<BlockHeader> {
        self.get_json("chains/main/blocks/head/header").await
    }

    async fn run_operation(&self, request: &RunOperationRequest) -> TezosResult<RunOperationResponse> {
        let path = "chains/main/blocks/head/helpers/scripts/run_operation";
        let (status, body) = self.post_json(path, request).await?;
        if !status.is_success() {
            tracing::warn!(status = %status, "Simulation request failed");
            return Err(TezosError::Network(format!("{} returned {}: {}", path, status, body)));
        }
        serde_json::from_value(body).map_err(TezosError::network)
    }

    async fn inject(&self, signed_bytes: &str) -> TezosResult<String> {
        let (status, body) = self.post_json("injection/operation?chain=main", signed_bytes).await?;
        match body {
            Value::String(hash) if status.is_success() => Ok(hash),
            other => {
                tracing::warn!(status = %status, "Injection rejected");
                Err(TezosError::InjectionRejected(other))
            }
        }
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

/// A usable node header names both the head block and the chain.
pub fn validate_header(header: Value) -> TezosResult<BlockHeader> {
    let has_field = |name: &str| header.get(name).is_some_and(|v| !v.is_null());
    if !has_field("hash") || !has_field("chain_id") {
        return Err(TezosError::RpcInvalidResponse);
    }
    serde_json::from_value(header).map_err(|_| TezosError::RpcInvalidResponse)
}

/// Nodes encode counters and balances as decimal strings.
fn parse_amount(value: &Value) -> Option<U256> {
    match value {
        Value::String(s) => decimal::parse(s).ok(),
        Value::Number(n) => n.as_u64().map(U256::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_normalizes_base_url() {
        let client = NodeClient::with_url("https://node.example.com", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://node.example.com/");
        assert_eq!(
            client.url("chains/main/blocks/head~2/hash"),
            "https://node.example.com/chains/main/blocks/head~2/hash"
        );
    }

    #[test]
    fn test_client_from_config() {
        let client = NodeClient::new(&RpcConfig::default()).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("timeout_secs: 30"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&json!("13186806")), Some(U256::from(13_186_806u64)));
        assert_eq!(parse_amount(&json!(42)), Some(U256::from(42u64)));
        assert_eq!(parse_amount(&json!("-1")), None);
        assert_eq!(parse_amount(&json!(null)), None);
    }

    #[test]
    fn test_validate_header() {
        let header = validate_header(json!({
            "protocol": "PtMumbai2TmsJHNGRkD8v8YDbtao7BLUC3wjASn1inAKLFCjaH1",
            "chain_id": "NetXdQprcVkpaWU",
            "hash": "BM9ZS9x59tNxAiZh86NKQNHcFs7WBqNpWuwKszg2mL2pYq3uP83",
            "level": 3625334,
        }))
        .unwrap();
        assert_eq!(header.chain_id.as_deref(), Some("NetXdQprcVkpaWU"));
        assert_eq!(header.level, Some(3_625_334));
    }

    #[test]
    fn test_validate_header_requires_identity() {
        let missing_hash = json!({ "chain_id": "NetXdQprcVkpaWU", "level": 1 });
        let missing_chain = json!({ "hash": "BM9ZS9x59tNxAiZh86NKQNHcFs7WBqNpWuwKszg2mL2pYq3uP83" });
        let null_chain = json!({
            "hash": "BM9ZS9x59tNxAiZh86NKQNHcFs7WBqNpWuwKszg2mL2pYq3uP83",
            "chain_id": null,
        });
        for header in [missing_hash, missing_chain, null_chain, json!("not a header")] {
            assert!(matches!(validate_header(header), Err(TezosError::RpcInvalidResponse)));
        }
    }

    #[tokio::test]
    async fn test_check_node_rejects_http() {
        let err = NodeClient::check_node("http://node.example.com/", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TezosError::RpcNoHttps));
    }

    #[tokio::test]
    async fn test_check_node_rejects_unparseable_url() {
        let err = NodeClient::check_node("https://", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TezosError::RpcInvalidUrl(_)));
    }
}

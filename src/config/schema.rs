//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config
//! file. Every section has defaults so an empty file is a valid config.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Node used when no RPC endpoint has been configured.
pub const DEFAULT_NODE_URL: &str = "https://blockchain-nodes.papers.tech/tezos/metamask/";

/// Environment variable holding the wallet's BIP32 private key.
pub const DEFAULT_PRIVATE_KEY_ENV_VAR: &str = "TEZOS_OPERATOR_PRIVATE_KEY";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct OperatorConfig {
    /// Node endpoint settings.
    pub rpc: RpcConfig,

    /// Key material settings.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network the configured node belongs to.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Ghostnet,
    Shadownet,
    Custom,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Ghostnet => "ghostnet",
            Network::Shadownet => "shadownet",
            Network::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "ghostnet" => Ok(Network::Ghostnet),
            "shadownet" => Ok(Network::Shadownet),
            "custom" => Ok(Network::Custom),
            other => Err(format!("unknown network \"{}\"", other)),
        }
    }
}

/// Node endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RpcConfig {
    /// Network label shown to the user.
    pub network: Network,

    /// Base URL of the node, always ending with `/`.
    pub node_url: String,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            node_url: DEFAULT_NODE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WalletConfig {
    /// Name of the environment variable holding the private key.
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: DEFAULT_PRIVATE_KEY_ENV_VAR.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

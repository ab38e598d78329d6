//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! tezos-operator.toml
//!     → loader.rs (parse & deserialize, normalize node URL)
//!     → validation.rs (semantic checks)
//!     → OperatorConfig (validated, immutable)
//!     → read by the CLI and handed to NodeClient / Wallet
//!
//! rpc set / rpc clear:
//!     → NodeClient::check_node (liveness + chain id)
//!     → loader.rs save_config (validated before write)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes are written back whole
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::Network;
pub use schema::ObservabilityConfig;
pub use schema::OperatorConfig;
pub use schema::RpcConfig;
pub use schema::WalletConfig;

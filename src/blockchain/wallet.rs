//! Wallet management and payload signing.
//!
//! # Security
//! - Key material comes from the host's BIP32 entropy or an environment variable
//! - Keys are never logged or serialized
//! - The watermark is only prepended to the signed digest, never stored

use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};
use serde::Deserialize;

use crate::blockchain::constants::DERIVATION_PATH;
use crate::blockchain::encoding::{self, prefix};
use crate::blockchain::types::{Account, SignedPayload, TezosError, TezosResult};

type Blake2b160 = Blake2b<U20>;
type Blake2b256 = Blake2b<U32>;

/// Key material derived by the host for the Tezos BIP32 path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bip32Entropy {
    /// `0x`-prefixed 32-byte ed25519 seed.
    pub private_key: String,
    /// `0x00`-prefixed public key, when provided.
    #[serde(default)]
    pub public_key: Option<String>,
}

/// Ed25519 wallet for a single Tezos implicit account.
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
}

impl Wallet {
    /// Create a wallet from a hex-encoded 32-byte seed (with or without 0x).
    pub fn from_private_key(private_key_hex: &str) -> TezosResult<Self> {
        let bytes = encoding::decode_hex(private_key_hex)
            .map_err(|e| TezosError::Wallet(format!("Invalid private key format: {}", e)))?;
        let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            TezosError::Wallet(format!(
                "Invalid private key length: expected 32 bytes, got {}",
                bytes.len()
            ))
        })?;

        let wallet = Self {
            signing_key: SigningKey::from_bytes(&seed),
        };
        tracing::info!(address = %wallet.address(), "Wallet initialized");
        Ok(wallet)
    }

    /// Create a wallet from host-provided BIP32 entropy.
    pub fn from_entropy(entropy: &Bip32Entropy) -> TezosResult<Self> {
        let wallet = Self::from_private_key(&entropy.private_key)?;

        // The host reports the key as 0x00 || pk; a mismatch means the wrong curve
        if let Some(reported) = &entropy.public_key {
            let reported = encoding::decode_hex(reported)?;
            let reported = reported.strip_prefix(&[0u8]).unwrap_or(&reported);
            if reported != wallet.public_key_bytes() {
                return Err(TezosError::Wallet(
                    "Public key does not match private key".to_string(),
                ));
            }
        }
        tracing::debug!(path = %DERIVATION_PATH.join("/"), "Wallet loaded from BIP32 entropy");
        Ok(wallet)
    }

    /// Load the wallet from the named environment variable.
    pub fn from_env(var_name: &str) -> TezosResult<Self> {
        let private_key = std::env::var(var_name).map_err(|_| {
            TezosError::Wallet(format!("Environment variable {} not set", var_name))
        })?;

        Self::from_private_key(private_key.trim())
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Public key in `edpk` encoding.
    pub fn public_key(&self) -> String {
        encoding::b58check_encode(&prefix::EDPK, &self.public_key_bytes())
    }

    /// `tz1` address: blake2b-160 of the public key.
    pub fn address(&self) -> String {
        let hash = Blake2b160::digest(self.public_key_bytes());
        encoding::b58check_encode(&prefix::TZ1, &hash)
    }

    pub fn account(&self) -> Account {
        Account {
            curve: "ed25519".to_string(),
            public_key: self.public_key(),
            address: self.address(),
        }
    }

    /// Sign hex-encoded `payload`, optionally behind a one-byte watermark.
    ///
    /// The signature covers blake2b-256(watermark || payload).
    pub fn sign(&self, payload: &str, watermark: Option<u8>) -> TezosResult<SignedPayload> {
        let bytes = encoding::decode_hex(payload)?;

        let mut hasher = Blake2b256::new();
        if let Some(mark) = watermark {
            hasher.update([mark]);
        }
        hasher.update(&bytes);
        let digest = hasher.finalize();

        let signature = self.signing_key.sign(&digest).to_bytes();
        let payload_hex = hex::encode(&bytes);

        Ok(SignedPayload {
            sbytes: format!("{}{}", payload_hex, hex::encode(signature)),
            sig: encoding::b58check_encode(&prefix::SIG, &signature),
            prefix_sig: encoding::b58check_encode(&prefix::EDSIG, &signature),
            bytes: payload_hex,
        })
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

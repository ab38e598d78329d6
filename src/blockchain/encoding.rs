//! Base58check and hex helpers for Tezos-prefixed values.

use crate::blockchain::types::{TezosError, TezosResult};

/// Version bytes prepended before base58check encoding.
pub mod prefix {
    pub const TZ1: [u8; 3] = [6, 161, 159];
    pub const EDPK: [u8; 4] = [13, 15, 37, 217];
    pub const EDSIG: [u8; 5] = [9, 245, 205, 134, 18];
    pub const SIG: [u8; 3] = [4, 130, 43];
}

/// Base58check-encode `payload` behind `prefix`.
pub fn b58check_encode(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    bs58::encode(data).with_check().into_string()
}

/// Decode hex with an optional `0x` prefix.
pub fn decode_hex(value: &str) -> TezosResult<Vec<u8>> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.len() % 2 != 0 {
        return Err(TezosError::encoding("Hex String has invalid length"));
    }
    hex::decode(digits).map_err(|_| TezosError::encoding("Hex String has invalid character"))
}

/// Implicit accounts (tz1, tz2, ...) as opposed to originated KT1 contracts.
pub fn is_implicit_address(address: &str) -> bool {
    address.to_ascii_lowercase().starts_with("tz")
}

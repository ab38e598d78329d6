//! Serde helpers for integers the node encodes as decimal strings.
//!
//! Mutez amounts, counters and limits are arbitrary-precision on chain, so
//! they travel as JSON strings. Plain JSON integers are accepted on input.

use alloy_primitives::U256;
use serde::{de::Error, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Str(String),
    Num(u64),
}

fn from_repr<E: Error>(repr: Repr) -> Result<U256, E> {
    match repr {
        Repr::Num(n) => Ok(U256::from(n)),
        Repr::Str(s) => parse(&s).map_err(E::custom),
    }
}

/// Parse a non-negative decimal integer.
pub fn parse(s: &str) -> Result<U256, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid decimal integer \"{}\"", s));
    }
    U256::from_str_radix(s, 10).map_err(|e| format!("invalid decimal integer \"{}\": {}", s, e))
}

/// Integer division rounding towards positive infinity.
pub fn ceil_div(numerator: U256, denominator: U256) -> U256 {
    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        quotient
    } else {
        quotient + U256::from(1u8)
    }
}

/// Serializes [`U256`] as a decimal string.
pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

/// Deserializes a decimal string or integer into [`U256`].
pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    from_repr(Repr::deserialize(deserializer)?)
}

/// Same as the parent module, for optional fields.
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Repr>::deserialize(deserializer)?
            .map(from_repr)
            .transpose()
    }
}

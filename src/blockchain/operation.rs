//! Operation kinds accepted from callers and their normalized forms.
//!
//! Requests carry optional economic fields. Normalization turns them into
//! [`Operation`] values where every field the node needs is present.

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::blockchain::decimal;
use crate::blockchain::types::{TezosError, TezosResult};

/// Every operation kind the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Endorsement,
    SeedNonceRevelation,
    DoubleEndorsementEvidence,
    DoubleBakingEvidence,
    ActivateAccount,
    Proposals,
    Ballot,
    Reveal,
    Transaction,
    Origination,
    Delegation,
}

impl OperationKind {
    pub const ALL: [OperationKind; 11] = [
        Self::Endorsement,
        Self::SeedNonceRevelation,
        Self::DoubleEndorsementEvidence,
        Self::DoubleBakingEvidence,
        Self::ActivateAccount,
        Self::Proposals,
        Self::Ballot,
        Self::Reveal,
        Self::Transaction,
        Self::Origination,
        Self::Delegation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Endorsement => "endorsement",
            Self::SeedNonceRevelation => "seed_nonce_revelation",
            Self::DoubleEndorsementEvidence => "double_endorsement_evidence",
            Self::DoubleBakingEvidence => "double_baking_evidence",
            Self::ActivateAccount => "activate_account",
            Self::Proposals => "proposals",
            Self::Ballot => "ballot",
            Self::Reveal => "reveal",
            Self::Transaction => "transaction",
            Self::Origination => "origination",
            Self::Delegation => "delegation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Manager operations pay fees and consume a counter slot.
    pub fn is_manager(&self) -> bool {
        matches!(
            self,
            Self::Reveal | Self::Transaction | Self::Origination | Self::Delegation
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Economic fields of a manager operation as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRequestFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, with = "decimal::option", skip_serializing_if = "Option::is_none")]
    pub fee: Option<U256>,
    #[serde(default, with = "decimal::option", skip_serializing_if = "Option::is_none")]
    pub counter: Option<U256>,
    #[serde(default, with = "decimal::option", skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<U256>,
    #[serde(default, with = "decimal::option", skip_serializing_if = "Option::is_none")]
    pub storage_limit: Option<U256>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevealRequest {
    #[serde(flatten)]
    pub manager: ManagerRequestFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(flatten)]
    pub manager: ManagerRequestFields,
    #[serde(default, with = "decimal::option", skip_serializing_if = "Option::is_none")]
    pub amount: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginationRequest {
    #[serde(flatten)]
    pub manager: ManagerRequestFields,
    #[serde(default, with = "decimal::option", skip_serializing_if = "Option::is_none")]
    pub balance: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelegationRequest {
    #[serde(flatten)]
    pub manager: ManagerRequestFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<String>,
}

/// Consensus or governance operation, forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassthroughOperation {
    pub kind: OperationKind,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// An operation as requested by a caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum OperationRequest {
    Reveal(RevealRequest),
    Transaction(TransactionRequest),
    Origination(OriginationRequest),
    Delegation(DelegationRequest),
    Passthrough(PassthroughOperation),
}

impl OperationRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Reveal(_) => OperationKind::Reveal,
            Self::Transaction(_) => OperationKind::Transaction,
            Self::Origination(_) => OperationKind::Origination,
            Self::Delegation(_) => OperationKind::Delegation,
            Self::Passthrough(op) => op.kind,
        }
    }

    /// Parse a JSON object keyed by `kind`.
    pub fn from_value(value: Value) -> TezosResult<Self> {
        let (kind, fields) = split_kind(value)?;
        if !kind.is_manager() {
            return Ok(Self::Passthrough(PassthroughOperation { kind, fields }));
        }

        let body = Value::Object(fields);
        let request = match kind {
            OperationKind::Reveal => Self::Reveal(parse_fields(kind, body)?),
            OperationKind::Transaction => Self::Transaction(parse_fields(kind, body)?),
            OperationKind::Origination => Self::Origination(parse_fields(kind, body)?),
            _ => Self::Delegation(parse_fields(kind, body)?),
        };
        Ok(request)
    }
}

impl TryFrom<Value> for OperationRequest {
    type Error = TezosError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn split_kind(value: Value) -> TezosResult<(OperationKind, Map<String, Value>)> {
    let Value::Object(mut fields) = value else {
        return Err(TezosError::property_not_defined("kind"));
    };
    let kind = match fields.remove("kind") {
        Some(Value::String(name)) => {
            OperationKind::from_name(&name).ok_or_else(|| TezosError::unsupported_kind(&name))?
        }
        Some(Value::Null) | None => return Err(TezosError::property_not_defined("kind")),
        Some(other) => return Err(TezosError::unsupported_kind(&other.to_string())),
    };
    Ok((kind, fields))
}

fn parse_fields<T: serde::de::DeserializeOwned>(kind: OperationKind, body: Value) -> TezosResult<T> {
    serde_json::from_value(body)
        .map_err(|e| TezosError::encoding(format!("invalid {} operation: {}", kind, e)))
}

/// Economic fields of a normalized manager operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerFields {
    pub source: String,
    #[serde(with = "decimal")]
    pub fee: U256,
    #[serde(with = "decimal")]
    pub counter: U256,
    #[serde(with = "decimal")]
    pub gas_limit: U256,
    #[serde(with = "decimal")]
    pub storage_limit: U256,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reveal {
    #[serde(flatten)]
    pub manager: ManagerFields,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(with = "decimal")]
    pub amount: U256,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origination {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(with = "decimal")]
    pub balance: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<String>,
    pub script: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    #[serde(flatten)]
    pub manager: ManagerFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManagerOperation {
    Reveal(Reveal),
    Transaction(Transaction),
    Origination(Origination),
    Delegation(Delegation),
}

impl ManagerOperation {
    pub fn fields(&self) -> &ManagerFields {
        match self {
            Self::Reveal(op) => &op.manager,
            Self::Transaction(op) => &op.manager,
            Self::Origination(op) => &op.manager,
            Self::Delegation(op) => &op.manager,
        }
    }

    pub fn fields_mut(&mut self) -> &mut ManagerFields {
        match self {
            Self::Reveal(op) => &mut op.manager,
            Self::Transaction(op) => &mut op.manager,
            Self::Origination(op) => &mut op.manager,
            Self::Delegation(op) => &mut op.manager,
        }
    }
}

/// A fully populated operation, ready for simulation and forging.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum Operation {
    Manager(ManagerOperation),
    Passthrough(PassthroughOperation),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Manager(ManagerOperation::Reveal(_)) => OperationKind::Reveal,
            Self::Manager(ManagerOperation::Transaction(_)) => OperationKind::Transaction,
            Self::Manager(ManagerOperation::Origination(_)) => OperationKind::Origination,
            Self::Manager(ManagerOperation::Delegation(_)) => OperationKind::Delegation,
            Self::Passthrough(op) => op.kind,
        }
    }

    pub fn is_reveal(&self) -> bool {
        self.kind() == OperationKind::Reveal
    }

    pub fn manager(&self) -> Option<&ManagerFields> {
        match self {
            Self::Manager(op) => Some(op.fields()),
            Self::Passthrough(_) => None,
        }
    }

    pub fn manager_mut(&mut self) -> Option<&mut ManagerFields> {
        match self {
            Self::Manager(op) => Some(op.fields_mut()),
            Self::Passthrough(_) => None,
        }
    }
}

impl Serialize for Operation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Manager(op) => op.serialize(serializer),
            Self::Passthrough(op) => op.serialize(serializer),
        }
    }
}

impl From<ManagerOperation> for Operation {
    fn from(op: ManagerOperation) -> Self {
        Self::Manager(op)
    }
}

impl TryFrom<Value> for Operation {
    type Error = TezosError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| TezosError::property_not_defined("kind"))?;
        let kind = OperationKind::from_name(kind).ok_or_else(|| TezosError::unsupported_kind(kind))?;

        if kind.is_manager() {
            let op = parse_fields(kind, value)?;
            return Ok(Self::Manager(op));
        }
        let (kind, fields) = split_kind(value)?;
        Ok(Self::Passthrough(PassthroughOperation { kind, fields }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADDRESS: &str = "tz1UNer1ijeE9ndjzSszRduR3CzX49hoBUB3";

    #[test]
    fn test_parse_transaction_request() {
        let request = OperationRequest::from_value(json!({
            "kind": "transaction",
            "amount": "1",
            "destination": ADDRESS,
        }))
        .unwrap();

        let OperationRequest::Transaction(tx) = request else {
            panic!("expected a transaction");
        };
        assert_eq!(tx.amount, Some(U256::from(1u64)));
        assert_eq!(tx.destination.as_deref(), Some(ADDRESS));
        assert_eq!(tx.manager, ManagerRequestFields::default());
    }

    #[test]
    fn test_missing_kind() {
        let err = OperationRequest::from_value(json!({ "amount": "1" })).unwrap_err();
        assert!(matches!(err, TezosError::PropertyNotDefined(ref p) if p == "kind"));
    }

    #[test]
    fn test_unknown_kind() {
        let err = OperationRequest::from_value(json!({ "kind": "smart_rollup_publish" })).unwrap_err();
        assert!(matches!(err, TezosError::UnsupportedOperationKind(ref k) if k == "smart_rollup_publish"));
    }

    #[test]
    fn test_passthrough_keeps_fields() {
        let raw = json!({
            "kind": "ballot",
            "source": ADDRESS,
            "period": 98,
            "proposal": "PtNairobiyssHuh87hEhfVBGCVrK3WnS8Z2FT4ymB5tAa4r1nQf",
            "ballot": "yay",
        });
        let request: OperationRequest = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(request.kind(), OperationKind::Ballot);

        let OperationRequest::Passthrough(op) = request else {
            panic!("expected passthrough");
        };
        assert_eq!(serde_json::to_value(Operation::Passthrough(op)).unwrap(), raw);
    }

    #[test]
    fn test_manager_operation_wire_shape() {
        let op = Operation::Manager(ManagerOperation::Transaction(Transaction {
            manager: ManagerFields {
                source: ADDRESS.into(),
                fee: U256::from(454u64),
                counter: U256::from(13_186_807u64),
                gas_limit: U256::from(1001u64),
                storage_limit: U256::ZERO,
            },
            amount: U256::from(1u64),
            destination: ADDRESS.into(),
            parameters: None,
        }));

        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "transaction",
                "source": ADDRESS,
                "fee": "454",
                "counter": "13186807",
                "gas_limit": "1001",
                "storage_limit": "0",
                "amount": "1",
                "destination": ADDRESS,
            })
        );

        let back: Operation = serde_json::from_value(value).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_incomplete_manager_operation_is_not_passthrough() {
        let result = serde_json::from_value::<Operation>(json!({
            "kind": "transaction",
            "amount": "1",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_name(kind.as_str()), Some(kind));
        }
        assert!(OperationKind::Delegation.is_manager());
        assert!(!OperationKind::Endorsement.is_manager());
    }
}

//! Operation preparation, signing and submission.
//!
//! # Responsibilities
//! - Resolve chain context and normalize caller requests
//! - Estimate limits and fees, then forge
//! - Sign the forged bytes behind the operation watermark
//! - Inject and return the operation hash
//!
//! Every call builds its own batch; nothing is shared between calls except
//! the injected node client and wallet.

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::broadcast::broadcast_transaction;
use crate::blockchain::client::TezosRpc;
use crate::blockchain::constants::OPERATION_WATERMARK;
use crate::blockchain::context::resolve_chain_context;
use crate::blockchain::estimator::estimate_and_replace_limits_and_fee;
use crate::blockchain::forger::Forger;
use crate::blockchain::normalizer::normalize_operations;
use crate::blockchain::operation::OperationRequest;
use crate::blockchain::types::{
    EstimationOutcome, SignedOperation, SignedPayload, TezosError, TezosResult, WrappedOperation,
};
use crate::blockchain::wallet::Wallet;

/// Forged and signed batch, ready for injection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedOperation {
    pub operation: WrappedOperation,
    pub forged: String,
    #[serde(flatten)]
    pub signed: SignedOperation,
}

/// Pipeline from caller requests to an injected operation.
pub struct OperationPipeline<'a> {
    rpc: &'a dyn TezosRpc,
    forger: &'a dyn Forger,
    wallet: &'a Wallet,
    override_parameters: bool,
}

impl<'a> OperationPipeline<'a> {
    pub fn new(rpc: &'a dyn TezosRpc, forger: &'a dyn Forger, wallet: &'a Wallet) -> Self {
        Self {
            rpc,
            forger,
            wallet,
            override_parameters: true,
        }
    }

    /// Keep caller-supplied limits and fees unless they are placeholders.
    pub fn keep_caller_parameters(mut self) -> Self {
        self.override_parameters = false;
        self
    }

    /// Normalize, estimate and forge `requests`.
    pub async fn prepare(&self, requests: Vec<OperationRequest>) -> TezosResult<EstimationOutcome> {
        let address = self.wallet.address();
        let context = resolve_chain_context(self.rpc, &address).await?;

        if requests.is_empty() {
            return Err(TezosError::NoOperation);
        }

        let wrapped = normalize_operations(
            self.rpc,
            &address,
            &self.wallet.public_key(),
            requests,
            &context,
        )
        .await?;

        estimate_and_replace_limits_and_fee(self.rpc, self.forger, wrapped, self.override_parameters).await
    }

    /// Prepare `requests` and sign the forged bytes.
    pub async fn prepare_and_sign(&self, requests: Vec<OperationRequest>) -> TezosResult<PreparedOperation> {
        let span = tracing::info_span!("prepare", request_id = %Uuid::new_v4());
        async {
            let outcome = self.prepare(requests).await?;
            let signature = self.wallet.sign(&outcome.forged, Some(OPERATION_WATERMARK))?;
            tracing::info!(operations = outcome.operation.contents.len(), "Operation signed");

            Ok(PreparedOperation {
                operation: outcome.operation,
                forged: outcome.forged,
                signed: SignedOperation { signature },
            })
        }
        .instrument(span)
        .await
    }

    /// Prepare, sign and inject `requests`, returning the operation hash.
    pub async fn send(&self, requests: Vec<OperationRequest>) -> TezosResult<String> {
        let span = tracing::info_span!("send", request_id = %Uuid::new_v4());
        async {
            let outcome = self.prepare(requests).await?;
            let signature = self.wallet.sign(&outcome.forged, Some(OPERATION_WATERMARK))?;
            broadcast_transaction(self.rpc, &signature.sbytes).await
        }
        .instrument(span)
        .await
    }

    /// Sign arbitrary caller bytes, without watermark.
    pub fn sign_payload(&self, payload: &str) -> TezosResult<SignedPayload> {
        self.wallet.sign(payload, None)
    }
}

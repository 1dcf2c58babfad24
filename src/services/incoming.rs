use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::services::merchant::CallbackForwarder;
use crate::services::signature::{CallbackKind, WebhookVerifier};

/// Deposit event pushed by the payment provider. Passed through to the
/// merchant untouched; only `transaction_id` is read locally.
///
/// Amounts stay `serde_json::Number` so an integer amount is forwarded as an
/// integer and a fractional one keeps its digits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositCallback {
    #[serde(rename = "type", default)]
    pub callback_type: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default = "zero_amount")]
    pub amount: Number,
    #[serde(default = "zero_amount")]
    pub fee: Number,
    #[serde(default = "zero_amount")]
    pub net_amount: Number,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub chain: Value,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub wallet_address: Value,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub method: String,
}

fn zero_amount() -> Number {
    Number::from(0)
}

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("failed to decode callback payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct IncomingService {
    verifier: WebhookVerifier,
    forwarder: Arc<dyn CallbackForwarder>,
}

impl IncomingService {
    pub fn new(verifier: WebhookVerifier, forwarder: Arc<dyn CallbackForwarder>) -> Self {
        Self { verifier, forwarder }
    }

    /// Verifies and decodes a deposit callback, then hands it to the
    /// forwarder on a detached task. Returns as soon as the forward is
    /// scheduled; its outcome is only logged.
    pub fn process_deposit_callback(
        &self,
        body: &[u8],
        signature: &str,
        timestamp: &str,
    ) -> Result<(), WebhookError> {
        if !self
            .verifier
            .verify(CallbackKind::Deposit, body, signature, timestamp)
        {
            return Err(WebhookError::InvalidSignature);
        }

        let data: DepositCallback = serde_json::from_slice(body)?;

        tracing::info!(
            transaction_id = %data.transaction_id,
            "Processing deposit callback"
        );

        self.dispatch(data);
        Ok(())
    }

    fn dispatch(&self, data: DepositCallback) {
        let forwarder = Arc::clone(&self.forwarder);

        tokio::spawn(async move {
            match forwarder.forward(&data).await {
                Ok(status) => tracing::info!(
                    transaction_id = %data.transaction_id,
                    status = %status,
                    "Merchant responded"
                ),
                Err(e) => tracing::error!(
                    transaction_id = %data.transaction_id,
                    error = %e,
                    "Error calling merchant"
                ),
            }
        });
    }
}

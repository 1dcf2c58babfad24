use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::services::incoming::DepositCallback;

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Destination for verified callbacks.
#[async_trait]
pub trait CallbackForwarder: Send + Sync {
    async fn forward(&self, payload: &DepositCallback) -> Result<StatusCode, ForwardError>;
}

/// POSTs callbacks as JSON to the merchant API. One attempt, no retry.
#[derive(Clone)]
pub struct MerchantClient {
    client: Client,
    url: String,
}

impl MerchantClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, ForwardError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl CallbackForwarder for MerchantClient {
    async fn forward(&self, payload: &DepositCallback) -> Result<StatusCode, ForwardError> {
        tracing::info!(url = %self.url, "Forwarding callback to merchant");

        let response = self.client.post(&self.url).json(payload).send().await?;

        Ok(response.status())
    }
}

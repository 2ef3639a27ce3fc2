use crate::errors::SubmitError;
use crate::models::NormalizedLead;
use async_trait::async_trait;
use reqwest;
use std::time::Duration;
use tracing;

/// Status and body of a quote API response, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers one serialized lead to the quote API.
///
/// Implementations perform exactly one request per call and never retry.
/// An `Err` means no HTTP response was obtained.
#[async_trait]
pub trait QuoteTransport: Send + Sync {
    async fn post_lead(&self, lead: &NormalizedLead) -> Result<TransportResponse, SubmitError>;
}

/// Client for the external quote API.
#[derive(Clone)]
pub struct QuoteApiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl QuoteApiClient {
    /// Creates a new `QuoteApiClient`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL the lead is POSTed to.
    /// * `timeout` - Overall request timeout.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::Network(format!("Failed to create quote client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QuoteTransport for QuoteApiClient {
    async fn post_lead(&self, lead: &NormalizedLead) -> Result<TransportResponse, SubmitError> {
        tracing::info!("Posting quote request to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(lead)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SubmitError::InvalidResponse(format!("Failed to read body: {}", e)))?;

        tracing::debug!("Quote API returned {} ({} bytes)", status, body.len());
        Ok(TransportResponse { status, body })
    }
}

//! Quote submission
//!
//! A [`LeadSubmission`] represents one form instance. It posts a validated
//! lead through a [`QuoteTransport`] exactly once per attempt and tracks
//! the attempt state:
//!
//! ```text
//! Idle -> Submitting -> Submitted
//!                    \-> Failed
//! ```
//!
//! `Submitted` and `Failed` are final for the attempt; [`LeadSubmission::reset`]
//! goes back to `Idle`. Failures are never retried automatically.
use crate::errors::{SubmitError, GENERIC_SUBMIT_FAILURE};
use crate::models::{NormalizedLead, QuoteApiResponse};
use crate::quote_client::{QuoteTransport, TransportResponse};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Submitted,
    Failed(SubmitError),
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Idle => f.write_str("idle"),
            SubmissionState::Submitting => f.write_str("submitting"),
            SubmissionState::Submitted => f.write_str("submitted"),
            SubmissionState::Failed(_) => f.write_str("failed"),
        }
    }
}

pub struct LeadSubmission {
    transport: Arc<dyn QuoteTransport>,
    state: SubmissionState,
}

impl LeadSubmission {
    pub fn new(transport: Arc<dyn QuoteTransport>) -> Self {
        Self {
            transport,
            state: SubmissionState::Idle,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Returns to `Idle` so the same lead can be submitted again.
    pub fn reset(&mut self) {
        tracing::debug!("Submission {} -> idle", self.state);
        self.state = SubmissionState::Idle;
    }

    /// Posts `lead` to the quote API.
    ///
    /// Only legal from `Idle`; otherwise returns [`SubmitError::NotIdle`]
    /// without touching the network or the current state.
    pub async fn submit(&mut self, lead: &NormalizedLead) -> Result<(), SubmitError> {
        if self.state != SubmissionState::Idle {
            tracing::warn!("Refusing to submit: attempt is {}", self.state);
            return Err(SubmitError::NotIdle);
        }

        self.state = SubmissionState::Submitting;
        tracing::debug!("Submission idle -> submitting");

        let outcome = match self.transport.post_lead(lead).await {
            Ok(response) => interpret_response(&response),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(()) => {
                tracing::info!("✓ Quote request accepted by quote API");
                self.state = SubmissionState::Submitted;
            }
            Err(e) => {
                tracing::warn!("❌ Quote request failed: {}", e);
                self.state = SubmissionState::Failed(e.clone());
            }
        }

        outcome
    }
}

/// Decides whether a quote API response counts as accepted.
///
/// Non-2xx statuses fail with a generic message. A 2xx response must carry
/// a truthy `success`; otherwise its `message` (if any) is reported.
pub fn interpret_response(response: &TransportResponse) -> Result<(), SubmitError> {
    if !response.is_success_status() {
        return Err(SubmitError::Status(response.status));
    }

    let body: QuoteApiResponse = serde_json::from_str(&response.body)
        .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?;

    if body.is_success() {
        Ok(())
    } else {
        let message = body.message_text().unwrap_or(GENERIC_SUBMIT_FAILURE);
        Err(SubmitError::Rejected(message.to_string()))
    }
}

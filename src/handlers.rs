use crate::config::Config;
use crate::errors::AppError;
use crate::models::{QuoteIntakeResponse, RawLeadInput};
use crate::quote_client::QuoteTransport;
use crate::submitter::LeadSubmission;
use crate::validation::validate;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use moka::future::Cache;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Quote forms are small; anything larger is not a form post.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub const SUCCESS_NOTICE: &str =
    "Quote Request Submitted! We'll contact you within 24 hours with your personalized quotation.";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Transport used to reach the quote API.
    pub transport: Arc<dyn QuoteTransport>,
    /// Fingerprints of leads whose submission is still in flight.
    /// Entries expire on their own if a request dies before releasing them.
    pub in_flight: Cache<String, ()>,
}

impl AppState {
    pub fn new(config: Config, transport: Arc<dyn QuoteTransport>) -> Self {
        let in_flight = Cache::builder()
            .time_to_live(config.quote_timeout() + Duration::from_secs(5))
            .max_capacity(10_000)
            .build();

        Self {
            config,
            transport,
            in_flight,
        }
    }
}

/// Stable identifier for a lead that keeps the phone number out of logs.
pub fn lead_fingerprint(phone: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(phone.as_bytes());
    hex::encode(hasher.finalize())[..16].to_string()
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "safiertech-quote",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/quote
///
/// Validates the quote form and forwards the normalized lead to the quote
/// API. Validation problems come back as 422 with one message per field;
/// a failed delivery comes back as 502 with a notice that points the user
/// to the phone line. A second submission for the same phone number while
/// the first is still in flight is refused with 409.
pub async fn submit_quote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawLeadInput>, JsonRejection>,
) -> Result<(StatusCode, Json<QuoteIntakeResponse>), AppError> {
    let Json(raw) = payload.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::BadRequest(e.body_text())
        }
    })?;

    let lead = validate(&raw)?;
    let fingerprint = lead_fingerprint(lead.phone());
    tracing::info!(
        "📨 Quote request: lead={}, type={}, city={}",
        fingerprint,
        lead.property_type(),
        lead.city()
    );

    let entry = state
        .in_flight
        .entry(fingerprint.clone())
        .or_insert(())
        .await;
    if !entry.is_fresh() {
        return Err(AppError::Conflict(
            "A quote request for this phone number is already being submitted".to_string(),
        ));
    }

    let mut submission = LeadSubmission::new(state.transport.clone());
    let outcome = submission.submit(&lead).await;
    state.in_flight.invalidate(&fingerprint).await;

    match outcome {
        Ok(()) => {
            tracing::info!("✅ Quote request delivered: lead={}", fingerprint);
            Ok((
                StatusCode::CREATED,
                Json(QuoteIntakeResponse {
                    success: true,
                    message: SUCCESS_NOTICE.to_string(),
                }),
            ))
        }
        Err(source) => Err(AppError::SubmitFailed {
            source,
            notice: state.config.failure_notice(),
        }),
    }
}

/// Quote intake routes, without rate limiting.
pub fn quote_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/quote", post(submit_quote))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// Full application around `quote_routes`.
///
/// The caller layers the quote routes (rate limiting in production, nothing
/// in tests); `/health` is always left unlimited.
pub fn router(state: Arc<AppState>, quote_routes: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(quote_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Integration tests with a mocked quote API
/// Tests the submission workflow and the intake route without hitting the real endpoint
use axum::body::Body;
use axum::http::{Request, StatusCode};
use safiertech_quote::config::Config;
use safiertech_quote::errors::{SubmitError, GENERIC_SUBMIT_FAILURE};
use safiertech_quote::handlers::{quote_routes, router, AppState, MAX_BODY_BYTES, SUCCESS_NOTICE};
use safiertech_quote::models::{NormalizedLead, RawLeadInput};
use safiertech_quote::quote_client::QuoteApiClient;
use safiertech_quote::submitter::{LeadSubmission, SubmissionState};
use safiertech_quote::validation::validate;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create test config
fn create_test_config(quote_endpoint: String) -> Config {
    Config {
        port: 8080,
        quote_endpoint,
        quote_timeout_secs: 5,
        contact_phone: "8745078808".to_string(),
    }
}

fn client_for(endpoint: String) -> Arc<QuoteApiClient> {
    Arc::new(QuoteApiClient::new(endpoint, Duration::from_secs(5)).unwrap())
}

fn anil_form() -> Value {
    json!({
        "name": "Anil Kumar",
        "phone": "9876543210",
        "city": "Ghaziabad",
        "propertyType": "Residential",
        "monthlyBill": "3000",
        "preferredTime": "Anytime",
        "consent": true
    })
}

fn anil_lead() -> NormalizedLead {
    let raw: RawLeadInput = serde_json::from_value(anil_form()).unwrap();
    validate(&raw).unwrap()
}

fn expected_wire_body() -> Value {
    json!({
        "name": "Anil Kumar",
        "phone": "+919876543210",
        "email": null,
        "city": "Ghaziabad",
        "type": "Residential",
        "loadKw": null,
        "monthlyBill": 3000,
        "roofArea": null,
        "preferredTime": "Anytime",
        "message": "",
        "recaptchaToken": null
    })
}

async fn post_json(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/quote")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_submit_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/quote.php"))
        .and(header("content-type", "application/json"))
        .and(body_json(expected_wire_body()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(format!("{}/quote.php", mock_server.uri()));
    let mut submission = LeadSubmission::new(client);

    let result = submission.submit(&anil_lead()).await;

    assert!(result.is_ok());
    assert_eq!(submission.state(), &SubmissionState::Submitted);
}

#[tokio::test]
async fn test_submit_server_error_then_resubmit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/quote.php"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(format!("{}/quote.php", mock_server.uri()));
    let mut submission = LeadSubmission::new(client);
    let lead = anil_lead();

    let err = submission.submit(&lead).await.unwrap_err();
    assert_eq!(err, SubmitError::Status(500));
    assert_eq!(err.message(), GENERIC_SUBMIT_FAILURE);
    assert_eq!(
        submission.state(),
        &SubmissionState::Failed(SubmitError::Status(500))
    );

    // Same lead, no re-validation
    submission.reset();
    assert_eq!(submission.state(), &SubmissionState::Idle);
    assert!(submission.submit(&lead).await.is_err());
}

#[tokio::test]
async fn test_submit_rejected_with_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "reCAPTCHA verification failed"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(format!("{}/quote.php", mock_server.uri()));
    let mut submission = LeadSubmission::new(client);

    let err = submission.submit(&anil_lead()).await.unwrap_err();
    assert_eq!(err.message(), "reCAPTCHA verification failed");
    assert!(matches!(submission.state(), SubmissionState::Failed(_)));
}

#[tokio::test]
async fn test_submit_network_failure() {
    // Nothing listens on port 1
    let client = client_for("http://127.0.0.1:1/quote.php".to_string());
    let mut submission = LeadSubmission::new(client);

    let err = submission.submit(&anil_lead()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Network(_)));
    assert_eq!(err.message(), GENERIC_SUBMIT_FAILURE);
}

#[tokio::test]
async fn test_quote_route_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/quote.php"))
        .and(body_json(expected_wire_body()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/quote.php", mock_server.uri());
    let state = AppState::new(create_test_config(endpoint.clone()), client_for(endpoint));
    let app = router(Arc::new(state), quote_routes());

    let (status, body) = post_json(app, anil_form()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], SUCCESS_NOTICE);
}

#[tokio::test]
async fn test_quote_route_validation_errors_do_not_call_remote() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/quote.php", mock_server.uri());
    let state = AppState::new(create_test_config(endpoint.clone()), client_for(endpoint));
    let app = router(Arc::new(state), quote_routes());

    let mut form = anil_form();
    form["phone"] = json!("123456");
    let (status, body) = post_json(app, form).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["errors"]["phone"],
        "Please enter a valid Indian phone number"
    );
}

#[tokio::test]
async fn test_quote_route_remote_failure_suggests_phone() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/quote.php", mock_server.uri());
    let state = AppState::new(create_test_config(endpoint.clone()), client_for(endpoint));
    let app = router(Arc::new(state), quote_routes());

    let (status, body) = post_json(app, anil_form()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Submission Failed. Please try again or call us directly at 8745078808."
    );
}

#[tokio::test]
async fn test_quote_route_malformed_json() {
    let endpoint = "http://127.0.0.1:1/quote.php".to_string();
    let state = AppState::new(create_test_config(endpoint.clone()), client_for(endpoint));
    let app = router(Arc::new(state), quote_routes());

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/quote")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_duplicate_is_refused() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/quote.php", mock_server.uri());
    let state = AppState::new(create_test_config(endpoint.clone()), client_for(endpoint));
    let app = router(Arc::new(state), quote_routes());

    let first = tokio::spawn(post_json(app.clone(), anil_form()));
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Same phone in a different spelling
    let mut duplicate = anil_form();
    duplicate["phone"] = json!("+919876543210");
    let (status, _) = post_json(app.clone(), duplicate).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = first.await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_failed_submission_releases_in_flight_guard() {
    let mock_server = MockServer::start().await;

    // First attempt fails upstream, the retry succeeds
    Mock::given(method("POST"))
        .and(path("/quote.php"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/quote.php"))
        .and(body_json(expected_wire_body()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/quote.php", mock_server.uri());
    let state = AppState::new(create_test_config(endpoint.clone()), client_for(endpoint));
    let app = router(Arc::new(state), quote_routes());

    let (status, _) = post_json(app.clone(), anil_form()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    // Retry right away reaches the quote API instead of hitting 409
    let (status, body) = post_json(app, anil_form()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_oversized_body_is_refused() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/quote.php", mock_server.uri());
    let state = AppState::new(create_test_config(endpoint.clone()), client_for(endpoint));
    let app = router(Arc::new(state), quote_routes());

    let mut form = anil_form();
    form["message"] = json!("x".repeat(MAX_BODY_BYTES + 1));
    let payload = form.to_string();

    // Declared length over the limit
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/quote")
        .header("content-type", "application/json")
        .header("content-length", payload.len().to_string())
        .body(Body::from(payload.clone()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // No declared length, limit hit while reading the body
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/quote")
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use safiertech_quote::config::Config;
use safiertech_quote::handlers::{self, AppState};
use safiertech_quote::quote_client::QuoteApiClient;

/// Main entry point for the quote intake service.
///
/// Initializes tracing, loads configuration, builds the quote API client and
/// serves the intake routes behind a per-IP rate limiter.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safiertech_quote=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let client = QuoteApiClient::new(config.quote_endpoint.clone(), config.quote_timeout())
        .map_err(|e| anyhow::anyhow!("Failed to initialize quote client: {}", e))?;
    tracing::info!("✓ Quote API client initialized: {}", client.endpoint());

    let port = config.port;
    let app_state = Arc::new(AppState::new(config, Arc::new(client)));

    // 2 requests/second per IP, burst of 5; a human fills the form far slower
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let protected_routes = handlers::quote_routes().layer(ServiceBuilder::new().layer(
        GovernorLayer {
            config: governor_conf,
        },
    ));

    // Health check bypasses rate limiting
    let app = handlers::router(app_state, protected_routes);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

use anyhow::Context;
use credit_quote_api::config::{Config, StoreBackend};
use credit_quote_api::db::Database;
use credit_quote_api::db_storage::PgApplicantStore;
use credit_quote_api::handlers::AppState;
use credit_quote_api::router::{api_routes, build_router};
use credit_quote_api::scoring::ScoringStrategy;
use credit_quote_api::store::{ApplicantStore, InMemoryApplicantStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The applicant store (PostgreSQL or in-memory).
/// - The scoring strategy (weighted formula or learned model).
/// - HTTP routes and middleware (CORS, body limit, rate limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_quote_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let store: Arc<dyn ApplicantStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let db = Database::new(url, config.db_max_connections).await?;
            db.ensure_schema().await?;
            tracing::info!("Database connection pool established");
            Arc::new(PgApplicantStore::new(db.pool.clone()))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory applicant store; records are lost on restart");
            Arc::new(InMemoryApplicantStore::new())
        }
    };

    // Model load failures fall back to the default score instead of aborting
    let scoring = ScoringStrategy::resolve(config.scoring_mode, &config.model_path);

    let app_state = Arc::new(AppState::new(store, config.clone(), scoring));

    // Per-IP rate limiting on the API routes
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    let protected_routes = api_routes().layer(
        ServiceBuilder::new()
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    let app = build_router(app_state, protected_routes);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

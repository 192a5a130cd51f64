use std::net::SocketAddr;
use std::sync::Arc;

use lead_desk_api::cache::QueryCache;
use lead_desk_api::config::{Config, StoreBackend};
use lead_desk_api::db::Database;
use lead_desk_api::handlers::{self, AppState};
use lead_desk_api::leads::LeadOperations;
use lead_desk_api::notify::NotificationLog;
use lead_desk_api::scoring::RandomScoringStrategy;
use lead_desk_api::store::{InMemoryLeadStore, LeadStore, PgLeadStore, RestLeadStore};
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Connects the configured lead store.
async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn LeadStore>> {
    let store: Arc<dyn LeadStore> = match &config.store {
        StoreBackend::Rest { url, api_key } => {
            let store = RestLeadStore::new(url.clone(), api_key.clone(), config.leads_table.clone())
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            tracing::info!("✓ REST lead store initialized: {}", url);
            Arc::new(store)
        }
        StoreBackend::Postgres { database_url } => {
            let db = Database::new(database_url).await?;
            db.ensure_schema(&config.leads_table).await?;
            tracing::info!("Database connection pool established");
            Arc::new(PgLeadStore::new(db.pool.clone(), config.leads_table.clone()))
        }
        StoreBackend::Memory => Arc::new(InMemoryLeadStore::new()),
    };
    Ok(store)
}

/// Main entry point for the application.
///
/// Initializes logging, configuration, the lead store, the listing cache,
/// the notification log and the scoring strategy, then serves the HTTP API
/// with rate limiting, body limits, CORS and request tracing.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_desk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let store = connect_store(&config).await?;

    // Listing cache: invalidated after every successful mutation, TTL as a backstop
    let cache = Arc::new(QueryCache::new(config.listing_cache_ttl));
    tracing::info!(
        "Listing cache initialized ({}s TTL)",
        config.listing_cache_ttl.as_secs()
    );

    let notifications = Arc::new(NotificationLog::new(config.notification_history));
    let scorer = Arc::new(RandomScoringStrategy::new(config.scoring_delay));

    let leads = LeadOperations::new(store, cache, notifications.clone(), scorer);

    // Build application state
    let app_state = Arc::new(AppState {
        leads,
        config: config.clone(),
        notifications,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let app = handlers::routes(app_state)
        .layer(
            ServiceBuilder::new()
                // Request size limit: lead payloads are tiny
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

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

//! HTTP server bootstrap for the Places review service.
//!
//! This module wires together:
//! - configuration
//! - the SQLite connection pool and embedded migrations
//! - core services (review store, commitment verifier, external clients)
//! - the Axum router

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::chain::{ChainConfig, HttpReceiptProvider, TxStatusClient, TxStatusConfig};
use crate::infra::ReviewStore;
use crate::lookup::{BarcodeLookupClient, BarcodeLookupConfig};
use crate::verify::ReviewVerifier;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL.
    pub database_url: String,
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Maximum database connections.
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://places.db?mode=rwc".to_string());

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .expect("Invalid listen address");

        let max_connections: u32 = std::env::var("MAX_DB_CONNECTIONS")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5);

        Self {
            database_url,
            listen_addr,
            max_connections,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReviewStore>,
    pub verifier: Arc<ReviewVerifier>,
    pub lookup: Option<Arc<BarcodeLookupClient>>,
    pub tx_status: Option<Arc<TxStatusClient>>,
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Places review service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Max connections: {}", config.max_connections);

    // Connect to SQLite
    info!("Opening review database...");
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(ReviewStore::new(pool));
    info!("Review database opened");

    let migrate_on_startup = std::env::var("DB_MIGRATE_ON_STARTUP")
        .ok()
        .map(|v| {
            !matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "off"
            )
        })
        .unwrap_or(true);
    if migrate_on_startup {
        info!("Running database migrations...");
        store.initialize().await?;
        info!("Database migrations applied");
    } else {
        info!("DB migrations skipped (DB_MIGRATE_ON_STARTUP=0)");
    }

    if std::env::var("SEED_DEMO_PRODUCTS").map(|v| v == "1").unwrap_or(false) {
        let seeded = store.seed_demo_products().await?;
        info!("Seeded {} demo products", seeded);
    }

    // Chain access for commitment verification
    let chain_config = ChainConfig::from_env();
    info!("Chain RPC endpoint: {}", chain_config.rpc_url);
    let provider = Arc::new(HttpReceiptProvider::new(&chain_config)?);
    let verifier = Arc::new(ReviewVerifier::new(provider, store.clone()));

    // External barcode lookup (optional - only if the API key is set)
    let lookup = match BarcodeLookupConfig::from_env() {
        Some(lookup_config) => {
            info!("Barcode lookup configured: {}", lookup_config.base_url);
            Some(Arc::new(BarcodeLookupClient::new(lookup_config)))
        }
        None => {
            info!("Barcode lookup not configured (set BARCODE_API_KEY to enable)");
            None
        }
    };

    // Developer portal transaction status (optional)
    let tx_status = match TxStatusConfig::from_env() {
        Some(tx_config) => {
            info!("Transaction status client configured: {}", tx_config.base_url);
            Some(Arc::new(TxStatusClient::new(tx_config)))
        }
        None => {
            info!(
                "Transaction status client not configured (set APP_ID and DEV_PORTAL_API_KEY to enable)"
            );
            None
        }
    };

    // Create application state
    let state = AppState {
        store,
        verifier,
        lookup,
        tx_status,
    };

    // Build router
    let app = build_router()?.with_state(state);

    // Start server
    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!("Places review service is ready to accept connections");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

/// Build the application router. Public so tests can drive the full HTTP
/// stack without binding a socket.
pub fn build_router() -> anyhow::Result<Router<AppState>> {
    let mut router = Router::new()
        .nest("/api", crate::api::router())
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http());

    if let Some(cors_layer) = cors_layer_from_env()? {
        router = router.layer(cors_layer);
    }

    Ok(router)
}

fn cors_layer_from_env() -> anyhow::Result<Option<CorsLayer>> {
    let origins = match std::env::var("CORS_ALLOW_ORIGINS") {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };

    let origins = origins.trim();
    if origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {s:?}: {e}"))
            })
            .collect::<anyhow::Result<_>>()?;
        AllowOrigin::list(origins)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ]),
    ))
}

/// Health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "service": "places-reviews",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check endpoint.
async fn readiness_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<axum::Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    match state.store.ping().await {
        Ok(_) => Ok(axum::Json(serde_json::json!({
            "status": "ready",
            "database": "connected",
        }))),
        Err(e) => Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            format!("Database unavailable: {}", e),
        )),
    }
}

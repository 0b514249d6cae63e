use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::scraper::DelhiHighCourtScraper;
use crate::services::{CaseSearchService, SeaOrmCaseSearchService};

mod assets;
mod cases;
mod error;
mod observability;
mod system;
mod types;
mod validation;

pub use cases::requester_from_headers;
pub use error::ApiError;
pub use types::*;
pub use validation::sanitize_input;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub scraper: Arc<DelhiHighCourtScraper>,

    pub search_service: Arc<dyn CaseSearchService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

/// Connects the store and builds a live scraper from `config`.
///
/// # Errors
/// Fails if the database cannot be opened or the HTTP client cannot be built.
pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    let scraper = Arc::new(DelhiHighCourtScraper::from_config(&config.scraper)?);

    Ok(create_app_state_with_scraper(
        config,
        store,
        scraper,
        prometheus_handle,
    ))
}

#[must_use]
pub fn create_app_state_with_scraper(
    config: Config,
    store: Store,
    scraper: Arc<DelhiHighCourtScraper>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    let search_service = Arc::new(SeaOrmCaseSearchService::new(store.clone(), scraper.clone()));

    Arc::new(AppState {
        config: Arc::new(config),
        store,
        scraper,
        search_service,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/search", post(cases::search))
        .route("/case", get(cases::get_case))
        .route("/cases/recent", get(cases::recent_cases))
        .route("/suggest", get(cases::suggestions))
        .route("/stats", get(system::stats))
        .route("/health", get(system::health))
        .route("/test-scraper", get(system::test_scraper))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback(assets::serve_asset)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_requests))
}

//! Health, statistics and scraper diagnostics.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HealthDto, StatsDto};
use crate::scraper::ConnectionReport;

/// `GET /api/health`
///
/// Reports database connectivity. Returns 500 when the database is down.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let db_ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            false
        }
    };

    let body = HealthDto {
        status: if db_ok { "healthy" } else { "unhealthy" },
        database: if db_ok { "connected" } else { "disconnected" },
        uptime_secs: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if db_ok {
        (StatusCode::OK, Json(ApiResponse::success(body))).into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse {
                success: false,
                data: Some(body),
                error: Some("Database unavailable".to_string()),
                code: Some("database_error".to_string()),
            }),
        )
            .into_response()
    }
}

/// Search counts by type and the number of stored cases.
///
/// # Endpoint
/// `GET /api/stats`
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatsDto>>, ApiError> {
    let stats = state.search_service.statistics().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// Probes the court website once.
///
/// # Endpoint
/// `GET /api/test-scraper`
///
/// Always 200; reachability is reported in the body.
pub async fn test_scraper(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ConnectionReport>> {
    let report = state.scraper.test_connection().await;
    tracing::info!(
        url = %report.url,
        reachable = report.reachable,
        status = report.status,
        has_captcha = report.has_captcha,
        "Scraper connection test finished"
    );
    Json(ApiResponse::success(report))
}

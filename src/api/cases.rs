//! Case search endpoints.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{sanitize_input, validate_limit, validate_query_length};
use super::{ApiError, ApiResponse, AppState, CaseDetailDto, CaseDto, SearchRequest, SearchResultDto};
use crate::constants::limits;
use crate::models::{CaseStatus, Requester};
use crate::parser::{ValidationError, current_year, suggest};
use crate::services::{ResultSource, SearchError};

#[derive(Debug, Deserialize)]
pub struct CaseQuery {
    pub number: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// Client address and user agent, as reported by proxy headers when present.
pub fn requester_from_headers(headers: &HeaderMap) -> Requester {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    };

    let ip_address = header("x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .or_else(|| header("x-real-ip"));

    Requester {
        ip_address,
        user_agent: header("user-agent"),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(sanitize_input).filter(|v| !v.is_empty())
}

/// Searches by case number or party name.
///
/// # Endpoint
/// `POST /api/search`
///
/// When both fields are present the case number is used. The result source is
/// attached to the response extensions.
pub async fn search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SearchRequest>,
) -> Result<(Extension<ResultSource>, Json<ApiResponse<SearchResultDto>>), ApiError> {
    let requester = requester_from_headers(&headers);
    let service = &state.search_service;

    let response = if let Some(case_number) = non_empty(request.case_number.as_deref()) {
        validate_query_length(&case_number)?;
        service
            .search_by_case_number(&case_number, request.refresh, &requester)
            .await?
    } else if let Some(party_name) = non_empty(request.party_name.as_deref()) {
        validate_query_length(&party_name)?;
        service
            .search_by_party_name(&party_name, request.refresh, &requester)
            .await?
    } else {
        return Err(SearchError::from(ValidationError::MissingQuery).into());
    };

    Ok((
        Extension(response.source),
        Json(ApiResponse::success(response.into())),
    ))
}

/// `GET /api/case?number=LPA%20123/2023`
pub async fn get_case(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CaseQuery>,
) -> Result<Json<ApiResponse<CaseDetailDto>>, ApiError> {
    let number = sanitize_input(&query.number);
    if number.is_empty() {
        return Err(ApiError::validation("Case number is required"));
    }

    let detail = state
        .search_service
        .get_case(&number)
        .await?
        .ok_or_else(|| ApiError::not_found("Case", &number))?;

    Ok(Json(ApiResponse::success(detail.into())))
}

/// `GET /api/cases/recent?limit=10&status=pending`
pub async fn recent_cases(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<CaseDto>>>, ApiError> {
    let limit = validate_limit(query.limit.unwrap_or(limits::DEFAULT_RECENT_LIMIT))?;

    let cases = match non_empty(query.status.as_deref()) {
        Some(status) => state
            .store
            .cases_by_status(&CaseStatus::from_raw(&status), limit)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?,
        None => state.search_service.recent_cases(limit).await?,
    };

    Ok(Json(ApiResponse::success(
        cases.into_iter().map(CaseDto::from).collect(),
    )))
}

/// Case-type and year completions for the search box.
///
/// # Endpoint
/// `GET /api/suggest?q=W.P`
pub async fn suggestions(Query(query): Query<SuggestQuery>) -> Json<ApiResponse<Vec<String>>> {
    let q = sanitize_input(&query.q);
    Json(ApiResponse::success(suggest(&q, current_year())))
}

// HTTP request handlers
use crate::infrastructure::dashboard_view::dashboard_to_view;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;

async fn respond<T: Serialize>(
    headers: &HeaderMap,
    result: Result<T, ApiError>,
) -> Response<Body> {
    let compress = accepts_brotli(headers);

    let response = match result {
        Ok(data) => json_response(StatusCode::OK, &data, compress).await,
        Err(e) => {
            if e.status() == StatusCode::NOT_FOUND {
                tracing::debug!("{}", e);
            } else {
                tracing::error!("{}", e);
            }
            json_response(e.status(), &e.body(), compress).await
        }
    };

    match response {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all groups visible to the token
pub async fn list_groups(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    tracing::debug!("list_groups");
    let result = state.board_service.list_groups().await.map_err(ApiError::from);
    respond(&headers, result).await
}

pub async fn group_details(
    Path(group_id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    tracing::debug!("group_details group_id={}", group_id);
    let result = state
        .board_service
        .group_details(group_id)
        .await
        .map_err(ApiError::from);
    respond(&headers, result).await
}

pub async fn project_boards(
    Path(project_id): Path<u64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    tracing::debug!("project_boards project_id={}", project_id);
    let result = state
        .board_service
        .project_boards(project_id)
        .await
        .map_err(ApiError::from);
    respond(&headers, result).await
}

/// Materialized dashboard of a group board
pub async fn group_board(
    Path((group_id, board_id)): Path<(u64, u64)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    tracing::debug!("group_board group_id={} board_id={}", group_id, board_id);
    let result = state
        .board_service
        .group_board(group_id, board_id)
        .await
        .map(|board| dashboard_to_view(&board))
        .map_err(ApiError::from);
    respond(&headers, result).await
}

/// Materialized dashboard of a project board
pub async fn project_board(
    Path((project_id, board_id)): Path<(u64, u64)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    tracing::debug!("project_board project_id={} board_id={}", project_id, board_id);
    let result = state
        .board_service
        .project_board(project_id, board_id)
        .await
        .map(|board| dashboard_to_view(&board))
        .map_err(ApiError::from);
    respond(&headers, result).await
}

pub async fn not_found(headers: HeaderMap) -> Response<Body> {
    respond::<()>(&headers, Err(ApiError::NotFound("page not found".to_string()))).await
}

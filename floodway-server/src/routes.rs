use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{BoxError, Json, Router};
use floodway_core::prelude::*;
use floodway_core::parse_id_list;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::config::ListenConfig;
use crate::error::ApiError;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>, limits: &ListenConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/flood_events", get(all_flood_events))
        .route("/flood_events/id/", get(flood_events_by_id))
        .route("/flood_events/{flood_id}", get(flood_event))
        .route("/roads/nearest", get(nearest_road))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .concurrency_limit(limits.concurrency_limit)
                .timeout(Duration::from_secs(limits.request_timeout_secs)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "request timed out" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("unhandled middleware error: {err}") })),
        )
    }
}

/// Run CPU-bound work against the shared state off the async workers
async fn run_blocking<T, F>(state: Arc<AppState>, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState) -> Result<T, floodway_core::Error> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || work(state.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn health() -> &'static str {
    "OK"
}

/// Flood point as listed by `/flood_events`, with a `GeoJSON` geometry
#[derive(Serialize)]
struct FloodEventView {
    #[serde(flatten)]
    point: FloodPoint,
    geom: geojson::Geometry,
}

async fn all_flood_events(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let points = run_blocking(state, |state| state.store.all_points()).await?;
    if points.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No records found" })),
        )
            .into_response());
    }

    let events: Vec<FloodEventView> = points.into_iter().map(FloodEventView::from).collect();
    Ok(Json(events).into_response())
}

impl From<FloodPoint> for FloodEventView {
    fn from(point: FloodPoint) -> Self {
        Self {
            geom: point.geom(),
            point,
        }
    }
}

async fn flood_event(
    State(state): State<Arc<AppState>>,
    flood_id: Result<Path<FloodId>, PathRejection>,
) -> Result<Json<FloodEventView>, ApiError> {
    let Path(flood_id) = flood_id.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    run_blocking(state, move |state| state.store.get_point(flood_id))
        .await?
        .map(|point| Json(FloodEventView::from(point)))
        .ok_or_else(|| ApiError::NotFound("Flood event not found".to_string()))
}

#[derive(Debug, Deserialize)]
struct FloodIdsQuery {
    flood_event_ids: Option<String>,
}

async fn flood_events_by_id(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FloodIdsQuery>,
) -> Result<Json<Vec<DelayResult>>, ApiError> {
    let raw = query
        .flood_event_ids
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("flood_event_ids parameter is required".to_string()))?;

    let ids = parse_id_list(&raw).map_err(|_| {
        ApiError::BadRequest(
            "flood_event_ids must be a comma-separated list of integers".to_string(),
        )
    })?;
    debug!(?ids, "resolving flood events");

    let results = run_blocking(state, move |state| state.resolver().resolve_many(&ids)).await?;
    if results.is_empty() {
        return Err(ApiError::NotFound("Flood event(s) not found".to_string()));
    }
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
struct PointQuery {
    lat: f64,
    lon: f64,
    #[serde(default)]
    crs: Option<Crs>,
}

async fn nearest_road(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PointQuery>, QueryRejection>,
) -> Result<Json<DelayResult>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut point = QueryPoint::new(query.lat, query.lon);
    if let Some(crs) = query.crs {
        point = point.with_crs(crs);
    }

    let result = run_blocking(state, move |state| state.resolver().resolve_point(None, &point)).await?;
    Ok(Json(result))
}

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use socialdash_core::{ComparisonMode, EntitySet};
use socialdash_metrics::{build_dashboard, normalize_entity_set, DashboardReport, Insight};

use crate::middleware::RequestId;

use super::{
    json_body, map_metrics_error, query_params, resolve_mode, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ModeQuery {
    pub mode: Option<String>,
}

fn snapshot_input(
    state: &AppState,
    req_id: &RequestId,
    query: Result<Query<ModeQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(EntitySet, ComparisonMode), ApiError> {
    let query = query_params(req_id, query)?;
    let mode = resolve_mode(req_id, query.mode.as_deref(), state.config.trend_mode)?;
    let raw = json_body(req_id, body)?;
    let set = normalize_entity_set(&raw).map_err(|e| map_metrics_error(req_id.0.clone(), &e))?;
    Ok((set, mode))
}

pub(super) async fn list_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<ModeQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<Insight>>>, ApiError> {
    let (set, mode) = snapshot_input(&state, &req_id, query, body)?;
    let report = build_dashboard(&set, mode);
    Ok(ApiResponse::json(req_id, report.insights))
}

pub(super) async fn dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<ModeQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<DashboardReport>>, ApiError> {
    let (set, mode) = snapshot_input(&state, &req_id, query, body)?;
    tracing::debug!(request_id = %req_id.0, mode = %mode, "building dashboard report");
    Ok(ApiResponse::json(req_id, build_dashboard(&set, mode)))
}

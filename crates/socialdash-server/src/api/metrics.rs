use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde_json::Value;
use socialdash_metrics::{
    aggregate::summarize_entity_set,
    classify_steps, classify_trend,
    normalize::{normalize_number_list, normalize_trend_pair},
    normalize_entity_set, SummaryMetrics, Trend,
};

use crate::middleware::RequestId;

use super::{json_body, map_metrics_error, ApiError, ApiResponse};

pub(super) async fn summarize(
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<SummaryMetrics>>, ApiError> {
    let raw = json_body(&req_id, body)?;
    let set = normalize_entity_set(&raw).map_err(|e| map_metrics_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id, summarize_entity_set(&set)))
}

/// `{previous, current}`; a missing or null side counts as `0`.
pub(super) async fn classify(
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Trend>>, ApiError> {
    let raw = json_body(&req_id, body)?;
    let (previous, current) =
        normalize_trend_pair(&raw, "$").map_err(|e| map_metrics_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id, classify_trend(previous, current)))
}

/// A bare array of values; one trend per consecutive pair.
pub(super) async fn steps(
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<Trend>>>, ApiError> {
    let raw = json_body(&req_id, body)?;
    let values = normalize_number_list(Some(&raw), "$")
        .map_err(|e| map_metrics_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id, classify_steps(&values)))
}

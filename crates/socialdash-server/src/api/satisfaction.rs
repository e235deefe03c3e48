use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde_json::Value;
use socialdash_metrics::{
    bucket_satisfaction_scores, compute_satisfaction_distribution,
    normalize::{normalize_number_list, normalize_satisfaction_records},
    SatisfactionSlice,
};

use crate::middleware::RequestId;

use super::{json_body, map_metrics_error, ApiError, ApiResponse};

/// Accepts either level rows (`[{satisfaction_level, count}]`) or raw
/// scores (`{"scores": [4.5, 2, ...]}`).
pub(super) async fn distribution(
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<SatisfactionSlice>>>, ApiError> {
    let raw = json_body(&req_id, body)?;
    let records = match raw.get("scores") {
        Some(scores) => normalize_number_list(Some(scores), "scores")
            .map(|scores| bucket_satisfaction_scores(&scores)),
        None => normalize_satisfaction_records(Some(&raw)),
    }
    .map_err(|e| map_metrics_error(req_id.0.clone(), &e))?;
    let slices = compute_satisfaction_distribution(&records);
    Ok(ApiResponse::json(req_id, slices.to_vec()))
}

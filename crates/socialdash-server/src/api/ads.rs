use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use socialdash_core::RoiRecord;
use socialdash_metrics::{
    compute_aggregate_roi, compute_ctr_series, compute_roi, compute_roi_by_ad,
    normalize::normalize_roi_records, CtrPoint, RoiFilter, RoiResult,
};

use crate::middleware::RequestId;

use super::{json_body, map_metrics_error, query_params, ApiError, ApiResponse};

#[derive(Debug, Default, Deserialize)]
pub(super) struct RoiQuery {
    pub ad_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RoiQuery {
    fn into_filter(self, req_id: &RequestId) -> Result<RoiFilter, ApiError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ApiError::new(
                    req_id.0.clone(),
                    "validation_error",
                    format!("start_date {start} is after end_date {end}"),
                ));
            }
        }
        Ok(RoiFilter {
            ad_id: self.ad_id.filter(|id| !id.trim().is_empty()),
            start: self.start_date,
            end: self.end_date,
        })
    }
}

/// Shared prologue of every ROI route: parse the filter, then the rows.
fn roi_input(
    req_id: &RequestId,
    query: Result<Query<RoiQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(Vec<RoiRecord>, RoiFilter), ApiError> {
    let filter = query_params(req_id, query)?.into_filter(req_id)?;
    let raw = json_body(req_id, body)?;
    let records =
        normalize_roi_records(Some(&raw)).map_err(|e| map_metrics_error(req_id.0.clone(), &e))?;
    Ok((records, filter))
}

pub(super) async fn roi_per_period(
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<RoiQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<RoiResult>>>, ApiError> {
    let (records, filter) = roi_input(&req_id, query, body)?;
    Ok(ApiResponse::json(req_id, compute_roi(&records, &filter)))
}

pub(super) async fn roi_aggregate(
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<RoiQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<RoiResult>>, ApiError> {
    let (records, filter) = roi_input(&req_id, query, body)?;
    Ok(ApiResponse::json(
        req_id,
        compute_aggregate_roi(&records, &filter),
    ))
}

pub(super) async fn roi_by_ad(
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<RoiQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<RoiResult>>>, ApiError> {
    let (records, filter) = roi_input(&req_id, query, body)?;
    Ok(ApiResponse::json(req_id, compute_roi_by_ad(&records, &filter)))
}

pub(super) async fn ctr_trend(
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<RoiQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<CtrPoint>>>, ApiError> {
    let (records, filter) = roi_input(&req_id, query, body)?;
    Ok(ApiResponse::json(req_id, compute_ctr_series(&records, &filter)))
}

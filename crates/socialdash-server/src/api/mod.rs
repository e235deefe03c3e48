mod ads;
mod insights;
mod metrics;
mod satisfaction;

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Query, State,
    },
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use socialdash_core::{AppConfig, ComparisonMode};
use socialdash_metrics::MetricsError;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    trend_mode: ComparisonMode,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn json(request_id: RequestId, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id.0),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_metrics_error(request_id: String, error: &MetricsError) -> ApiError {
    tracing::debug!(error = %error, path = error.path(), "rejected malformed snapshot");
    ApiError::new(request_id, "validation_error", error.to_string())
}

/// Unwrap a JSON body, turning extractor rejections into enveloped errors.
pub(super) fn json_body<T>(
    request_id: &RequestId,
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            let code = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                "payload_too_large"
            } else {
                "validation_error"
            };
            Err(ApiError::new(
                request_id.0.clone(),
                code,
                rejection.body_text(),
            ))
        }
    }
}

/// Unwrap query parameters, turning extractor rejections into enveloped errors.
pub(super) fn query_params<T>(
    request_id: &RequestId,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ApiError> {
    query.map(|q| q.0).map_err(|rejection| {
        ApiError::new(
            request_id.0.clone(),
            "validation_error",
            rejection.body_text(),
        )
    })
}

/// Resolve the `?mode=` override, falling back to the configured mode.
pub(super) fn resolve_mode(
    request_id: &RequestId,
    requested: Option<&str>,
    configured: ComparisonMode,
) -> Result<ComparisonMode, ApiError> {
    match requested {
        None => Ok(configured),
        Some(raw) => raw
            .parse::<ComparisonMode>()
            .map_err(|reason| ApiError::new(request_id.0.clone(), "validation_error", reason)),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

fn metrics_router(rate_limit: RateLimitState, max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/v1/metrics/summary", post(metrics::summarize))
        .route("/api/v1/trends/classify", post(metrics::classify))
        .route("/api/v1/trends/steps", post(metrics::steps))
        .route("/api/v1/ads/roi", post(ads::roi_per_period))
        .route("/api/v1/ads/roi/aggregate", post(ads::roi_aggregate))
        .route("/api/v1/ads/roi/by-ad", post(ads::roi_by_ad))
        .route("/api/v1/ads/ctr-trend", post(ads::ctr_trend))
        .route(
            "/api/v1/users/satisfaction",
            post(satisfaction::distribution),
        )
        .route("/api/v1/insights", post(insights::list_insights))
        .route("/api/v1/dashboard", post(insights::dashboard))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .merge(public_routes)
        .merge(metrics_router(rate_limit, max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                )),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    ApiResponse::json(
        req_id,
        HealthData {
            status: "ok",
            trend_mode: state.config.trend_mode,
        },
    )
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

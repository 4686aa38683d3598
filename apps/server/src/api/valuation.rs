use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use hifi_valuation::ValuationOutcome;
use serde_json::Value;

/// Value a list of hi-fi units.
///
/// The body is parsed regardless of content type. A successful reply is the
/// model's JSON document, passed through unchanged.
#[utoipa::path(
    post,
    path = "/value",
    responses(
        (status = 200, description = "Valuation document produced by the model"),
        (status = 400, description = "No units provided"),
        (status = 500, description = "Model request failed or returned invalid JSON"),
        (status = 504, description = "Model request timed out")
    )
)]
pub async fn value_units(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid JSON body".to_string()))?;

    let valuation = state.valuation_service.value_json(&body);
    let outcome = match state.request_timeout {
        Some(limit) => tokio::time::timeout(limit, valuation)
            .await
            .map_err(|_| ApiError::Timeout)??,
        None => valuation.await?,
    };

    match outcome {
        ValuationOutcome::Parsed(value) => Ok(Json(value)),
        ValuationOutcome::InvalidJson { raw } => Err(ApiError::InvalidModelOutput { raw }),
        ValuationOutcome::SchemaMismatch { raw, .. } => Err(ApiError::SchemaMismatch { raw }),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    // Unit lists are unbounded; the body limit is lifted so oversize input is not a 413.
    Router::new().route("/value", post(value_units).layer(DefaultBodyLimit::disable()))
}

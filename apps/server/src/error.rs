use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hifi_valuation::ValuationError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Valuation(#[from] ValuationError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid JSON returned from model")]
    InvalidModelOutput { raw: String },
    #[error("Model output did not match valuation schema")]
    SchemaMismatch { raw: String },
    #[error("Model request timed out")]
    Timeout,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error, raw) = match self {
            ApiError::Valuation(e) if e.is_client_error() => {
                (StatusCode::BAD_REQUEST, message, None)
            }
            ApiError::Valuation(e) => match &e {
                ValuationError::Provider(reason) => {
                    tracing::error!(code = e.code(), "Model request failed: {}", reason);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Model request failed".to_string(),
                        None,
                    )
                }
                _ => {
                    tracing::error!(code = e.code(), "{}", message);
                    (StatusCode::INTERNAL_SERVER_ERROR, message, None)
                }
            },
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason, None),
            ApiError::Timeout => {
                tracing::error!("{}", message);
                (StatusCode::GATEWAY_TIMEOUT, message, None)
            }
            ApiError::InvalidModelOutput { raw } | ApiError::SchemaMismatch { raw } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, Some(raw))
            }
        };
        (status, Json(ErrorBody { error, raw })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

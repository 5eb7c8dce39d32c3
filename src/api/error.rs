use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use super::models::ErrorResponse;
use crate::ledger::LedgerError;
use crate::query::ReportError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("payload invalid: {0}")]
    InvalidPayload(String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("persistence failed: {0}")]
    PersistenceFailed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PersistenceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PersistenceFailed(_) => "PERSISTENCE_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(json!(body))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::InvalidPayload(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::InvalidPayload(value.body_text())
    }
}

impl From<LedgerError> for ApiError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::CorruptData { .. } => ApiError::Internal(value.to_string()),
            other => ApiError::PersistenceFailed(other.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(value: ReportError) -> Self {
        match value {
            ReportError::PageOutOfRange { .. } => ApiError::NotFound(value.to_string()),
            ReportError::ZeroThreshold | ReportError::PageZero => {
                ApiError::InvalidPayload(value.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        let err = ApiError::PersistenceFailed("disk full".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "PERSISTENCE_FAILED");

        let err = ApiError::NotFound("subject 7".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "resource not found: subject 7");
    }

    #[test]
    fn test_ledger_io_error_maps_to_persistence_failed() {
        let err: ApiError = LedgerError::Io(std::io::Error::other("boom")).into();
        assert_eq!(err.code(), "PERSISTENCE_FAILED");
    }

    #[test]
    fn test_report_errors_map_to_client_statuses() {
        let err: ApiError = ReportError::PageZero.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = ReportError::ZeroThreshold.into();
        assert_eq!(err.code(), "INVALID_PAYLOAD");

        let err: ApiError = ReportError::PageOutOfRange { page: 4, total: 2 }.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}

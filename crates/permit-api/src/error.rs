//! HTTP error mapping
use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use permit_core::{PermitError, ServiceError};
use permit_docs::DocsError;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Permit(#[from] PermitError),

    #[error("REQUEST/{0}")]
    BadRequest(String),

    #[error("INTERNAL/{0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Permit(err) => match err {
                PermitError::ThresholdRejection { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "THRESHOLD_REJECTION")
                }
                PermitError::ConcurrencyConflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
                PermitError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                PermitError::PackagingFailure(_) => (StatusCode::BAD_GATEWAY, "PACKAGING_FAILURE"),
                PermitError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                PermitError::UpstreamUnavailable(_)
                | PermitError::ScoringUnavailable(_)
                | PermitError::EvidenceNotFound(_)
                | PermitError::EvidenceRejected(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
                PermitError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
                PermitError::RunAborted(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RUN_ABORTED"),
            },
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Permit(PermitError::ThresholdRejection {
                score,
                threshold,
                issues,
            }) => Some(json!({ "score": score, "threshold": threshold, "issues": issues })),
            ApiError::Permit(PermitError::ConcurrencyConflict { current }) => {
                Some(json!({ "currentStatus": current }))
            }
            ApiError::Permit(PermitError::PackagingFailure(_)) => {
                Some(json!({ "retry": "generation" }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code,
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures while wiring the service together.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Templates(#[from] DocsError),

    #[error("CLIENT/{0}")]
    Client(#[from] ServiceError),

    #[error("METRICS/{0}")]
    Metrics(#[from] prometheus::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_core::RunStatus;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                PermitError::ThresholdRejection {
                    score: 40,
                    threshold: 60,
                    issues: vec![],
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PermitError::ConcurrencyConflict {
                    current: RunStatus::Generating,
                },
                StatusCode::CONFLICT,
            ),
            (PermitError::NotFound("p".to_string()), StatusCode::NOT_FOUND),
            (
                PermitError::PackagingFailure("upload".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                PermitError::InvalidRequest("id".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                PermitError::RunAborted("task panicked".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_and_code().0, expected);
        }
    }

    #[test]
    fn test_rejection_details_carry_score_and_issues() {
        let err = ApiError::from(PermitError::ThresholdRejection {
            score: 59,
            threshold: 60,
            issues: vec!["Roof too shaded".to_string()],
        });
        let details = err.details().unwrap();
        assert_eq!(details["score"], 59);
        assert_eq!(details["issues"][0], "Roof too shaded");
    }
}

//! HTTP error responses.

use actors::LifecycleError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by every handler; rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn status_for(err: &LifecycleError) -> StatusCode {
    match err {
        LifecycleError::NotFound(_) | LifecycleError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
        LifecycleError::InvalidTransition { .. }
        | LifecycleError::DuplicateName(_)
        | LifecycleError::Rename { .. } => StatusCode::CONFLICT,
        LifecycleError::InvalidRequest(_) | LifecycleError::InvalidDocumentName { .. } => {
            StatusCode::BAD_REQUEST
        }
        LifecycleError::StorageTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        LifecycleError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        LifecycleError::Storage(_)
        | LifecycleError::Tickets(_)
        | LifecycleError::TicketReissued(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        } else {
            tracing::debug!(error = %err, status = status.as_u16(), "Request refused");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use printflow_core::{JobAction, JobStatus, TicketId};

    #[test]
    fn lifecycle_errors_map_to_status_codes() {
        let cases = [
            (LifecycleError::NotFound(TicketId(1)), StatusCode::NOT_FOUND),
            (
                LifecycleError::DocumentNotFound("a.pdf".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                LifecycleError::InvalidTransition {
                    ticket: TicketId(1),
                    status: JobStatus::Rejected,
                    action: JobAction::Accept,
                },
                StatusCode::CONFLICT,
            ),
            (
                LifecycleError::DuplicateName("a.pdf".into()),
                StatusCode::CONFLICT,
            ),
            (
                LifecycleError::InvalidRequest("missing".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                LifecycleError::StorageTimeout("fetch a.pdf".into()),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                LifecycleError::Unavailable("gone".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::ErrorResponse;
use crate::validators::ValidationError;
use crate::WorkspaceError;

/// Converts [`WorkspaceError`] into appropriate HTTP responses.
///
/// Every error body is `{ "error": "<message>" }`. Storage and internal
/// failures are logged here with full detail and answered with a generic
/// message.
#[derive(Debug)]
pub struct AppError(pub WorkspaceError);

impl From<WorkspaceError> for AppError {
    fn from(err: WorkspaceError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self(WorkspaceError::Validation(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WorkspaceError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkspaceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            WorkspaceError::Forbidden | WorkspaceError::EmailMismatch => StatusCode::FORBIDDEN,
            WorkspaceError::NotFound => StatusCode::NOT_FOUND,
            WorkspaceError::NotPending
            | WorkspaceError::Expired
            | WorkspaceError::AlreadyInvited
            | WorkspaceError::LastOwner => StatusCode::CONFLICT,
            WorkspaceError::DatabaseError(msg) | WorkspaceError::Internal(msg) => {
                log::error!(target: "anteroom", "msg=\"unhandled error\", error=\"{msg}\"");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (WorkspaceError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (WorkspaceError::Forbidden, StatusCode::FORBIDDEN),
            (WorkspaceError::EmailMismatch, StatusCode::FORBIDDEN),
            (WorkspaceError::NotFound, StatusCode::NOT_FOUND),
            (WorkspaceError::NotPending, StatusCode::CONFLICT),
            (WorkspaceError::LastOwner, StatusCode::CONFLICT),
            (
                WorkspaceError::DatabaseError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}

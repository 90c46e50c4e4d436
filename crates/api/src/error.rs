use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API-level error with the HTTP mapping the invitation endpoints expose.
///
/// Validation failures and domain-state conflicts both map to 400; missing
/// entities map to 404; everything unexpected is logged server-side and
/// returned as an opaque 500 so internal detail never leaks to callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Opaque message for unexpected failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<crate::services::InvitationError> for ApiError {
    fn from(err: crate::services::InvitationError) -> Self {
        use crate::services::InvitationError::*;

        match err {
            MissingFields | InvalidRoleId | UnknownRole | DuplicateUser | MissingCredentials
            | InvalidToken | InvitationExpired | AlreadyAccepted => {
                ApiError::BadRequest(err.to_string())
            }
            UserNotFound | InvitationNotFound => ApiError::NotFound(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(format!("Database error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_bad_request_status() {
        let error = ApiError::BadRequest("All fields are required.".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_status() {
        let error = ApiError::NotFound("User not found.".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_status() {
        let error = ApiError::Internal("database connection failed".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_body_is_opaque() {
        let error = ApiError::Internal("secret pool detail".to_string());
        let response = error.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
        assert!(!body.to_string().contains("secret pool detail"));
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let error = ApiError::BadRequest("Invalid role.".to_string());
        let response = error.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"message": "Invalid role."}));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", ApiError::BadRequest("test".to_string())),
            "Bad request: test"
        );
        assert_eq!(
            format!("{}", ApiError::NotFound("test".to_string())),
            "Not found: test"
        );
    }

    #[test]
    fn test_from_invitation_error_mapping() {
        use crate::services::InvitationError;

        let error: ApiError = InvitationError::DuplicateUser.into();
        assert!(matches!(error, ApiError::BadRequest(m) if m == "User already exists."));

        let error: ApiError = InvitationError::UserNotFound.into();
        assert!(matches!(error, ApiError::NotFound(m) if m == "User not found."));

        let error: ApiError = InvitationError::NotificationFailed("smtp down".to_string()).into();
        assert!(matches!(error, ApiError::Internal(_)));
    }

    #[test]
    fn test_from_sqlx_error_is_internal() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::Internal(_)));
    }
}

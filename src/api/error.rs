//! Request failures and the exact responses they turn into.

use axum::{
    Json,
    http::{StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::db::StoreError;

pub const EMPTY_BODY_MESSAGE: &str = "Bad Request, body is needed";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "ERROR: Invalid User ID/Password";
pub const NOT_FOUND_MESSAGE: &str = "Resource Not Found";
pub const INVALID_BODY_MESSAGE: &str = "Bad Request, body is not a valid user";
pub const BASIC_CHALLENGE: &str = r#"Basic realm="lab-auth""#;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request body is missing")]
    EmptyBody,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("resource not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation { .. } => ApiError::Validation(err.to_string()),
            StoreError::Duplicate { .. } => ApiError::Conflict(err.to_string()),
            StoreError::Hash(_) | StoreError::Sqlx(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // These two answer with bare text, not JSON.
            ApiError::EmptyBody => (StatusCode::BAD_REQUEST, EMPTY_BODY_MESSAGE).into_response(),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, BASIC_CHALLENGE)],
                INVALID_CREDENTIALS_MESSAGE,
            )
                .into_response(),
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            ApiError::Validation(message) => {
                warn!("{}", message);
                json_error(StatusCode::BAD_REQUEST, &message)
            }
            ApiError::Conflict(message) => {
                warn!("{}", message);
                json_error(StatusCode::CONFLICT, &message)
            }
            ApiError::Internal(message) => {
                error!("{}", message);
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_store_error_mapping() {
        let err: ApiError = StoreError::Validation { field: "email" }.into();
        assert!(matches!(err, ApiError::Validation(ref m) if m == "email is required"));

        let err: ApiError = StoreError::Duplicate {
            username: "khoa".into(),
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = StoreError::Hash("boom".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::EmptyBody.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_body_shape() {
        let body = serde_json::to_string(&ErrorBody {
            error: NOT_FOUND_MESSAGE.to_string(),
        })
        .unwrap();
        assert_eq!(body, r#"{"error":"Resource Not Found"}"#);
    }

    #[tokio::test]
    async fn test_internal_hides_detail() {
        let response = ApiError::Internal("database is locked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            r#"{"error":"Internal Server Error"}"#
        );
    }

    #[tokio::test]
    async fn test_unauthorized_carries_basic_challenge() {
        let response = ApiError::InvalidCredentials.into_response();
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            BASIC_CHALLENGE
        );
        assert_eq!(body_text(response).await, INVALID_CREDENTIALS_MESSAGE);
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authentication token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Admin role required")]
    Forbidden,
    #[error("Token creation error")]
    TokenCreation,
    #[error("Application state unavailable")]
    MissingState,
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("{0}")]
    InvalidPayload(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum VoteError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Guide not found")]
    GuideNotFound,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

fn error_body(status: StatusCode, error_message: &str, details: String) -> Response {
    let body = Json(json!({
        "success": false,
        "error": error_message,
        "details": details
    }));

    (status, body).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Unauthorized: No token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Unauthorized: Invalid token"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden: Admin role required"),
            AuthError::TokenCreation => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create token")
            }
            AuthError::MissingState => (StatusCode::INTERNAL_SERVER_ERROR, "Unknown error"),
        };

        error_body(status, error_message, self.to_string())
    }
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            NotificationError::InvalidPayload(_) => {
                (StatusCode::BAD_REQUEST, "Invalid notification payload")
            }
            NotificationError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Notification broadcast failed")
            }
        };

        error_body(status, error_message, self.to_string())
    }
}

impl IntoResponse for VoteError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            VoteError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
            VoteError::GuideNotFound => (StatusCode::NOT_FOUND, "Guide not found"),
            VoteError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Vote failed"),
        };

        error_body(status, error_message, self.to_string())
    }
}

impl From<sqlx::Error> for VoteError {
    fn from(error: sqlx::Error) -> Self {
        VoteError::DatabaseError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidToken
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(error: serde_json::Error) -> Self {
        NotificationError::Internal(error.to_string())
    }
}

impl From<crate::notifications::UnknownJobQueue> for NotificationError {
    fn from(error: crate::notifications::UnknownJobQueue) -> Self {
        NotificationError::InvalidPayload(error.to_string())
    }
}

// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Reasons a presented token is refused.
///
/// Each kind is safe to surface to the caller; none of them carries the
/// token contents or the signing secret.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token scope does not match the requested operation")]
    ScopeMismatch,

    #[error("token could not be parsed")]
    Malformed,
}

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Missing bearer credentials")]
    MissingCredentials,

    #[error("Token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    Throttled,

    #[error("Birthday window must span at least one day (got {0})")]
    InvalidWindow(i64),

    #[error("Email already registered")]
    AlreadyRegistered,

    #[error("Email already verified")]
    AlreadyVerified,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredential | AppError::MissingCredentials | AppError::Token(_) => {
                StatusCode::UNAUTHORIZED
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Throttled => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidWindow(_) | AppError::AlreadyVerified | AppError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            },
            AppError::AlreadyRegistered => StatusCode::CONFLICT,
            AppError::Storage(_) | AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredential => "AUTH_001",
            AppError::MissingCredentials => "AUTH_002",
            AppError::Token(TokenError::InvalidSignature) => "TOKEN_001",
            AppError::Token(TokenError::Expired) => "TOKEN_002",
            AppError::Token(TokenError::ScopeMismatch) => "TOKEN_003",
            AppError::Token(TokenError::Malformed) => "TOKEN_004",
            AppError::NotFound(_) => "NF_001",
            AppError::Throttled => "RATE_001",
            AppError::InvalidWindow(_) => "BDAY_001",
            AppError::AlreadyRegistered => "USER_001",
            AppError::AlreadyVerified => "USER_002",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::Storage(_) => "STORE_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::InvalidCredential | AppError::MissingCredentials => {
                "Could not validate credentials".to_string()
            },
            AppError::Token(TokenError::Expired) => "Token has expired".to_string(),
            AppError::Token(TokenError::ScopeMismatch) => "Invalid token scope".to_string(),
            AppError::Token(_) => "Invalid token".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::Throttled => "Rate limit exceeded, please try again later".to_string(),
            AppError::InvalidWindow(_) => "Days must be positive".to_string(),
            AppError::AlreadyRegistered => "Email already registered".to_string(),
            AppError::AlreadyVerified => "Email already verified".to_string(),
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
            AppError::Storage(_) | AppError::Internal(_) | AppError::Io(_) => {
                "An internal server error occurred".to_string()
            },
            AppError::Json(_) => "Invalid data format".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

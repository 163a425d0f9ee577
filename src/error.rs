// src/error.rs

//! API error surface.
//!
//! Every failure leaving the auth core is reported with a small fixed
//! vocabulary of codes rather than raw internal errors. Page-surface
//! failures never reach this type; they become redirects instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Fixed error-code vocabulary for the RPC surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // ---
    /// No or invalid credential where one is required.
    Unauthenticated,
    /// Credential present but the action is disallowed (e.g. wrong password).
    PermissionDenied,
    /// Malformed input or an expired/missing ceremony session.
    InvalidArgument,
    /// Referenced identity or credential is absent.
    NotFound,
    /// Duplicate signup username.
    AlreadyExists,
    /// Rate limit tripped.
    ResourceExhausted,
    /// Storage or cryptographic-library failure.
    Internal,
}

impl ErrorCode {
    // ---
    fn status(self) -> StatusCode {
        // ---
        match self {
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A coded error returned from RPC handlers.
#[derive(Debug)]
pub struct ApiError {
    // ---
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    // ---
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        // ---
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceExhausted, message)
    }

    /// Internal failure. The wrapped error is logged, the client sees a
    /// generic message only.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        // ---
        tracing::error!("internal error: {err}");
        Self::new(ErrorCode::Internal, "internal error")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody {
    // ---
    code: ErrorCode,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        (
            self.code.status(),
            Json(ErrorBody {
                code: self.code,
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn codes_map_to_expected_statuses() {
        // ---
        assert_eq!(ErrorCode::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::PermissionDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::InvalidArgument.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::AlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::ResourceExhausted.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCode::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_hides_detail_from_clients() {
        // ---
        let err = ApiError::internal("connection reset by peer");
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "internal error");
    }
}

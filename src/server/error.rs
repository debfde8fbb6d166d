//! Error classification and response shaping for the HTTP surface.
//!
//! Maps every failure class to an HTTP status and a stable `type` string,
//! and builds the single JSON error payload the generate endpoint returns
//! when it fails before streaming.

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::Response;
use thiserror::Error;

use crate::config::ConfigError;
use crate::generate::{BridgeError, MalformedInputError, ProviderError};

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request rejected before any provider call
    #[error("Invalid request: {0}")]
    Input(#[from] MalformedInputError),

    /// Provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration rejected at server construction
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No bindable address in the configured range
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP error from response building
    #[error("HTTP error: {0}")]
    Http(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Input(input) => ApiError::Input(input),
            BridgeError::Provider(provider) => ApiError::Provider(provider),
        }
    }
}

impl From<axum::http::Error> for ApiError {
    fn from(err: axum::http::Error) -> Self {
        ApiError::Http(err.to_string())
    }
}

impl ApiError {
    /// Map error variant to appropriate HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Input(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(provider) => match provider {
                ProviderError::Auth { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::UNAUTHORIZED)
                }
                ProviderError::Quota { .. } => StatusCode::TOO_MANY_REQUESTS,
                ProviderError::Overloaded { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ProviderError::Upstream { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                ProviderError::Connect { .. } => StatusCode::BAD_GATEWAY,
                ProviderError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
                ProviderError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                ProviderError::IdleTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            },
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Bind { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string for JSON responses
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Input(_) => "invalid_request",
            ApiError::Provider(provider) => match provider {
                ProviderError::Auth { .. } => "auth_error",
                ProviderError::Quota { .. } => "quota_exhausted",
                ProviderError::Overloaded { .. } => "provider_overloaded",
                ProviderError::Upstream { .. } => "upstream_error",
                ProviderError::Connect { .. } => "connection_error",
                ProviderError::MalformedResponse { .. } => "malformed_response",
                ProviderError::Timeout { .. } => "request_timeout",
                ProviderError::IdleTimeout { .. } => "idle_timeout",
            },
            ApiError::Config(_) => "config_error",
            ApiError::Bind { .. } => "bind_error",
            ApiError::Http(_) => "http_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

/// Builder for standardized error responses
pub struct ErrorResponse;

impl ErrorResponse {
    /// Create a JSON error response from an ApiError
    pub fn from_error(err: &ApiError, request_id: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "type": err.error_type(),
                "message": err.to_string(),
                "request_id": request_id
            }
        });

        Response::builder()
            .status(err.status_code())
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build error response")
    }
}

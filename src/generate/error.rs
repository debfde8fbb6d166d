//! Error types for the generation bridge.
//!
//! Input errors are rejected before any network activity; provider errors
//! are caught at the bridge boundary and surfaced as a single terminal
//! stream event, never as code text.

use thiserror::Error;

/// Pre-flight request validation failures. Reported synchronously (HTTP 400).
#[derive(Debug, Error)]
pub enum MalformedInputError {
    #[error("prompt is empty and no image is attached")]
    EmptyPrompt,

    #[error("image data URI has no payload separator")]
    MissingPayloadSeparator,

    #[error("image data URI payload is empty")]
    EmptyPayload,

    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("unknown framework '{0}'")]
    UnknownFramework(String),
}

/// Provider-level failures.
///
/// Exactly one of these terminates a failed stream; the bridge never retries
/// internally. 503 is classified separately so callers can offer a
/// regenerate affordance for transient overload.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider connection failed: {source}")]
    Connect {
        #[source]
        source: reqwest::Error,
    },

    #[error("provider request timed out after {duration}s")]
    Timeout { duration: u64 },

    #[error("idle timeout after {duration}s of inactivity")]
    IdleTimeout { duration: u64 },

    #[error("provider authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("provider quota exhausted: {message}")]
    Quota { message: String },

    #[error("provider is overloaded: {message}")]
    Overloaded { message: String },

    #[error("provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("malformed provider response: {message}")]
    MalformedResponse { message: String },
}

impl ProviderError {
    /// Classify a non-success provider status plus its extracted message.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ProviderError::Auth { status, message },
            429 => ProviderError::Quota { message },
            503 => ProviderError::Overloaded { message },
            _ => ProviderError::Upstream { status, message },
        }
    }
}

/// Failures opening a generation stream.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Input(#[from] MalformedInputError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

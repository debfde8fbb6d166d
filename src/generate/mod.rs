//! Generation bridge: one prompt (optionally with a reference image) in, a
//! stream of UI code chunks out.
//!
//! The bridge speaks the provider's `streamGenerateContent` SSE protocol.
//! Every failure mode is normalized into [`ProviderError`] so callers never
//! see raw provider payloads where code text is expected.

mod error;
mod request;
mod sse;
mod stream;
mod wire;

pub use error::{BridgeError, MalformedInputError, ProviderError};
pub use request::{GenerationRequest, ImageAttachment};
pub use stream::{ChunkStream, GenerationChunk};

use std::time::Duration;

use reqwest::Client;
use tokio::time::timeout;
use tracing::debug;

use crate::config::{CredentialStatus, ProviderConfig};
use wire::{ErrorEnvelope, GenerateContentRequest};

/// Client for the streaming generation endpoint.
///
/// One bridge is built per server and shared across requests; the underlying
/// connection pool is reused.
pub struct GenerationBridge {
    client: Client,
    provider: ProviderConfig,
}

impl GenerationBridge {
    pub fn new(provider: ProviderConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(u64::from(
                provider.connect_timeout_seconds,
            )))
            .build()
            .expect("Failed to build provider client");

        Self { client, provider }
    }

    /// Opens a streaming generation for one request.
    ///
    /// Fails before the first chunk on missing credentials, connection
    /// errors, or a non-success provider status. Mid-stream failures surface
    /// as the stream's terminal item instead.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<ChunkStream, BridgeError> {
        let credential = match self.provider.resolve_credential() {
            CredentialStatus::Configured(secret) => secret,
            CredentialStatus::Unconfigured { reason } => {
                return Err(ProviderError::Auth {
                    status: 401,
                    message: format!("API key unavailable: {reason}"),
                }
                .into());
            }
        };

        debug!(
            model = %self.provider.model,
            framework = %request.framework,
            has_image = request.image.is_some(),
            "Opening generation stream"
        );

        // Execute the request phase with a timeout; the stream itself is
        // guarded by the idle deadline instead.
        let request_timeout = Duration::from_secs(u64::from(self.provider.request_timeout_seconds));
        let result = timeout(
            request_timeout,
            self.open_stream(credential.expose(), request),
        )
        .await;

        let response = match result {
            Ok(response) => response?,
            Err(_) => {
                return Err(ProviderError::Timeout {
                    duration: request_timeout.as_secs(),
                }
                .into());
            }
        };

        let idle_timeout = Duration::from_secs(u64::from(self.provider.idle_timeout_seconds));
        Ok(ChunkStream::new(
            Box::pin(response.bytes_stream()),
            idle_timeout,
        ))
    }

    async fn open_stream(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<reqwest::Response, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.provider.base_url, self.provider.model
        );
        let body = GenerateContentRequest::build(request, self.provider.temperature);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Connect { source: e })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ProviderError::Connect { source: e })?;
            return Err(ProviderError::from_status(
                status.as_u16(),
                error_message(&body),
            ));
        }

        Ok(response)
    }
}

/// Extracts a human-readable message from a non-success response body.
/// Falls back to the raw body, truncated, when it is not the documented
/// error envelope.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no error detail provided".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        }
    }
}

//! Route handlers for the generation server.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_core::Stream;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::generate::{
    ChunkStream, GenerationBridge, GenerationRequest, ImageAttachment, MalformedInputError,
    ProviderError,
};
use crate::preview::Framework;
use crate::scope::SCOPE_VERSION;
use crate::server::error::{ApiError, ErrorResponse};

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    bridge: Arc<GenerationBridge>,
}

impl AppState {
    pub fn new(bridge: GenerationBridge) -> Self {
        Self {
            bridge: Arc::new(bridge),
        }
    }
}

/// Request payload for `POST /api/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub prompt: String,
    pub base64_image: Option<String>,
    pub framework: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "promptcanvas",
        "scope_version": SCOPE_VERSION,
    }))
}

async fn generate(State(state): State<AppState>, Json(body): Json<GenerateBody>) -> Response {
    let request_id = Uuid::new_v4().to_string();
    info!(
        request_id = %request_id,
        framework = body.framework.as_deref().unwrap_or("html"),
        has_image = body.base64_image.is_some(),
        "Generation request accepted"
    );

    match open_generation(&state, &body, &request_id).await {
        Ok(response) => response,
        Err(error) => {
            warn!(request_id = %request_id, error = %error, "Generation request failed");
            ErrorResponse::from_error(&error, &request_id)
        }
    }
}

/// Validates the payload, opens the provider stream, and commits the
/// chunked response. Every failure here happens before the first body
/// byte, so the caller can still answer with a single JSON payload.
async fn open_generation(
    state: &AppState,
    body: &GenerateBody,
    request_id: &str,
) -> Result<Response, ApiError> {
    let framework = match &body.framework {
        None => Framework::default(),
        Some(raw) => Framework::parse(raw)
            .ok_or_else(|| MalformedInputError::UnknownFramework(raw.clone()))?,
    };
    let image = match &body.base64_image {
        None => None,
        Some(uri) => Some(ImageAttachment::from_data_uri(uri)?),
    };
    let request = GenerationRequest::new(body.prompt.clone(), image, framework)?;
    let stream = state.bridge.generate(&request).await?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("x-request-id", request_id)
        .body(Body::from_stream(PlainTextBody::new(
            stream,
            request_id.to_string(),
        )))?)
}

/// Adapts the chunk stream to a chunked HTTP body. A mid-stream provider
/// error aborts the body; the status line is already committed by then, so
/// error text is never mixed into the content.
struct PlainTextBody {
    inner: ChunkStream,
    request_id: String,
}

impl PlainTextBody {
    fn new(inner: ChunkStream, request_id: String) -> Self {
        Self { inner, request_id }
    }
}

impl Stream for PlainTextBody {
    type Item = Result<Bytes, ProviderError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(Bytes::from(chunk.text)))),
            Poll::Ready(Some(Err(error))) => {
                warn!(
                    request_id = %self.request_id,
                    error = %error,
                    "Generation stream failed mid-response"
                );
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

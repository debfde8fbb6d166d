//! Mock generation provider for bridge and endpoint tests.
//!
//! Speaks just enough of the `streamGenerateContent` SSE dialect to script
//! success streams, in-stream failures, and error statuses.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::routing::any;
use axum::Router;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// A captured request for assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Captured body is not JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A scripted response to return.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ProviderResponse {
    /// An SSE stream of text fragments shaped like `streamGenerateContent`
    /// events.
    pub fn stream(fragments: &[&str]) -> Self {
        let body: String = fragments.iter().map(|f| text_event(f)).collect();
        Self {
            status: 200,
            content_type: "text/event-stream".to_string(),
            body: body.into_bytes(),
        }
    }

    /// A stream delivering `fragments` and then an in-stream error event.
    pub fn stream_then_error(fragments: &[&str], code: u16, message: &str) -> Self {
        let mut body: String = fragments.iter().map(|f| text_event(f)).collect();
        body.push_str(&format!(
            "data: {}\n\n",
            serde_json::json!({ "error": { "code": code, "message": message } })
        ));
        Self {
            status: 200,
            content_type: "text/event-stream".to_string(),
            body: body.into_bytes(),
        }
    }

    /// A non-success status carrying a Gemini error envelope.
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({
            "error": { "code": status, "message": message, "status": "ERROR" }
        });
        Self {
            status,
            content_type: "application/json".to_string(),
            body: body.to_string().into_bytes(),
        }
    }
}

fn text_event(fragment: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": fragment }], "role": "model" } }
            ]
        })
    )
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    responses: Arc<Mutex<VecDeque<ProviderResponse>>>,
}

/// Mock provider server for testing.
pub struct MockProvider {
    pub addr: SocketAddr,
    state: MockState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl MockProvider {
    /// Start a new mock provider server.
    pub async fn start() -> Self {
        let state = MockState {
            requests: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(VecDeque::new())),
        };

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/{*path}", any(handle_request))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        // Wait for server to be ready
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    /// Enqueue a response to be returned for the next request.
    pub async fn enqueue_response(&self, resp: ProviderResponse) {
        self.state.responses.lock().await.push_back(resp);
    }

    /// Get all captured requests.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().await.clone()
    }

    /// Get the base URL for this mock server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn handle_request(State(state): State<MockState>, req: Request<Body>) -> Response<Body> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();

    let body_bytes = axum::body::to_bytes(req.into_body(), 1024 * 1024)
        .await
        .unwrap_or_default()
        .to_vec();

    state.requests.lock().await.push(CapturedRequest {
        method,
        path,
        query,
        headers,
        body: body_bytes,
    });

    let mock_resp = state
        .responses
        .lock()
        .await
        .pop_front()
        .unwrap_or_else(|| ProviderResponse::stream(&["ok"]));

    Response::builder()
        .status(StatusCode::from_u16(mock_resp.status).unwrap())
        .header("content-type", mock_resp.content_type)
        .body(Body::from(mock_resp.body))
        .unwrap()
}

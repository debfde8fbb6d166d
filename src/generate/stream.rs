use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Bytes;
use futures_core::Stream;
use tokio::time::{Instant, Sleep};

use crate::generate::error::ProviderError;
use crate::generate::sse::SseDecoder;
use crate::generate::wire::StreamEvent;

/// One text increment of a generation, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationChunk {
    /// Monotonic position, starting at 0 for the first chunk of a stream.
    pub seq: u64,
    pub text: String,
}

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Decoded generation stream with an idle timeout.
///
/// Yields `Ok(GenerationChunk)` items followed by at most one `Err` terminal.
/// If no bytes arrive within `idle_timeout`, the stream fails rather than
/// hanging on a provider stall. After any terminal event the stream is fused
/// and the upstream connection is released.
pub struct ChunkStream {
    inner: Option<ByteStream>,
    decoder: SseDecoder,
    pending: VecDeque<GenerationChunk>,
    terminal: Option<ProviderError>,
    next_seq: u64,
    idle_timeout: Duration,
    deadline: Pin<Box<Sleep>>,
    stats: Option<StreamStats>,
}

struct StreamStats {
    chunks: u64,
    bytes: u64,
    started: Instant,
}

impl ChunkStream {
    pub fn new(inner: ByteStream, idle_timeout: Duration) -> Self {
        Self {
            inner: Some(inner),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            terminal: None,
            next_seq: 0,
            idle_timeout,
            deadline: Box::pin(tokio::time::sleep(idle_timeout)),
            stats: Some(StreamStats {
                chunks: 0,
                bytes: 0,
                started: Instant::now(),
            }),
        }
    }

    fn finish(&mut self, outcome: &str) {
        if let Some(stats) = self.stats.take() {
            tracing::debug!(
                outcome,
                chunks = stats.chunks,
                bytes = stats.bytes,
                elapsed_ms = stats.started.elapsed().as_millis() as u64,
                "Generation stream finished"
            );
        }
    }

    fn reset_deadline(&mut self) {
        self.deadline
            .as_mut()
            .reset(Instant::now() + self.idle_timeout);
    }

    /// Decodes SSE payloads into queued chunks. An error event or an
    /// unparseable payload becomes the queued terminal and fuses the stream;
    /// chunks decoded before it are still delivered first.
    fn ingest(&mut self, payloads: Vec<String>) {
        for payload in payloads {
            match serde_json::from_str::<StreamEvent>(&payload) {
                Ok(event) => {
                    if let Some(error) = event.error {
                        self.inner = None;
                        self.finish("provider_error");
                        self.terminal =
                            Some(ProviderError::from_status(error.code, error.message));
                        return;
                    }
                    if let Some(text) = event.text() {
                        let seq = self.next_seq;
                        self.next_seq += 1;
                        if let Some(stats) = &mut self.stats {
                            stats.chunks += 1;
                        }
                        self.pending.push_back(GenerationChunk { seq, text });
                    }
                }
                Err(err) => {
                    self.inner = None;
                    self.finish("provider_error");
                    self.terminal = Some(ProviderError::MalformedResponse {
                        message: err.to_string(),
                    });
                    return;
                }
            }
        }
    }
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("pending", &self.pending)
            .field("terminal", &self.terminal)
            .field("next_seq", &self.next_seq)
            .field("idle_timeout", &self.idle_timeout)
            .field("fused", &self.inner.is_none())
            .finish_non_exhaustive()
    }
}

impl Stream for ChunkStream {
    type Item = Result<GenerationChunk, ProviderError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(chunk) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(chunk)));
            }
            if let Some(err) = this.terminal.take() {
                return Poll::Ready(Some(Err(err)));
            }
            if this.inner.is_none() {
                return Poll::Ready(None);
            }

            // Check if idle timeout has expired
            if this.deadline.as_mut().poll(cx).is_ready() {
                let duration = this.idle_timeout.as_secs();
                tracing::warn!(
                    idle_timeout_secs = duration,
                    "Generation stream idle timeout exceeded"
                );
                this.inner = None;
                this.finish("idle_timeout");
                return Poll::Ready(Some(Err(ProviderError::IdleTimeout { duration })));
            }

            let poll = match this.inner.as_mut() {
                Some(inner) => inner.as_mut().poll_next(cx),
                None => return Poll::Ready(None),
            };

            match poll {
                Poll::Ready(Some(Ok(bytes))) => {
                    // Reset deadline on successful data receipt
                    this.reset_deadline();
                    if let Some(stats) = &mut this.stats {
                        stats.bytes += bytes.len() as u64;
                    }
                    let payloads = this.decoder.push(&bytes);
                    this.ingest(payloads);
                }
                Poll::Ready(Some(Err(err))) => {
                    this.inner = None;
                    this.finish("transport_error");
                    return Poll::Ready(Some(Err(ProviderError::Connect { source: err })));
                }
                Poll::Ready(None) => {
                    if let Some(tail) = this.decoder.flush() {
                        this.ingest(vec![tail]);
                    }
                    this.inner = None;
                    if this.terminal.is_none() {
                        this.finish("complete");
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for ChunkStream {
    fn drop(&mut self) {
        self.finish("dropped");
    }
}

//! Incremental decoder for the `alt=sse` streaming wire format.
//!
//! The provider frames each JSON event as a `data:` line. Network chunks can
//! split a line at any byte, including inside a multibyte character, so the
//! decoder buffers raw bytes and only decodes complete lines.

/// Incremental SSE line decoder. Feed raw chunks with [`push`](Self::push),
/// then drain any unterminated tail with [`flush`](Self::flush) at end of
/// stream.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a network chunk and returns the payload of every `data:` line
    /// it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        // A \n byte never occurs inside a multibyte UTF-8 sequence, so
        // splitting the raw buffer at newlines is boundary safe.
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(payload) = decode_line(&line[..line.len() - 1]) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Decodes a trailing `data:` line that was never newline terminated.
    pub fn flush(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.buffer);
        decode_line(&tail)
    }
}

/// Extracts the payload of one SSE line. Non-data lines (event names, ids,
/// comments, blank separators) and the `[DONE]` marker yield `None`.
fn decode_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_suffix('\r').unwrap_or(&text);
    let payload = text.strip_prefix("data:")?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);
    if payload.is_empty() || payload.trim() == "[DONE]" {
        return None;
    }
    Some(payload.to_string())
}

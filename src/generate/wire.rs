//! Request and response payloads for the `streamGenerateContent` endpoint.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::generate::request::GenerationRequest;
use crate::preview::artifact::Framework;

/// System directive for frameworks previewed as an isolated document.
pub const MARKUP_DIRECTIVE: &str = "\
You are an expert web designer and frontend engineer. Generate a single \
self-contained user interface from the user's description and reference image.

Rules:
1. Output raw HTML styled exclusively with Tailwind CSS utility classes.
2. Respond with code only. No markdown, no code fences, no explanations.
3. Never emit <html>, <head> or <body> tags. The output is injected into an existing document.
4. Make the layout responsive so it renders well at desktop, tablet and mobile widths.
5. If a reference image is supplied, reproduce its layout, colors and typography as closely as possible.
6. Use HTML comments (<!-- ... -->) for any annotations.";

/// System directive for frameworks previewed as a live component tree.
pub const COMPONENT_DIRECTIVE: &str = "\
You are an expert web designer and frontend engineer. Generate a single \
self-contained user interface from the user's description and reference image.

Rules:
1. Output JSX markup styled exclusively with Tailwind CSS utility classes.
2. Respond with code only. No markdown, no code fences, no explanations, no import or export statements.
3. Never emit <html>, <head> or <body> tags. The output is mounted inside an existing component.
4. Make the layout responsive so it renders well at desktop, tablet and mobile widths.
5. If a reference image is supplied, reproduce its layout, colors and typography as closely as possible.
6. Only these identifiers are in scope: Fragment, Button, useState, useEffect, useRef, useMemo, useCallback.
7. Use JSX comments ({/* ... */}) for any annotations, never HTML comments.";

/// Selects the system directive for the target framework: markup for plain
/// HTML, component style for everything authored as a component body.
pub fn directive_for(framework: Framework) -> &'static str {
    match framework {
        Framework::Html => MARKUP_DIRECTIVE,
        Framework::React | Framework::NextJs | Framework::Vue => COMPONENT_DIRECTIVE,
    }
}

// ============================================================================
// Request payload
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Content,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
pub struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

impl GenerateContentRequest {
    /// Assembles the provider payload for one user turn. Image bytes are
    /// re-encoded to base64 for the inline data part.
    pub fn build(request: &GenerationRequest, temperature: f32) -> Self {
        let mut parts = vec![Part::Text {
            text: request.prompt.clone(),
        }];
        if let Some(image) = &request.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: STANDARD.encode(&image.bytes),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: directive_for(request.framework).to_string(),
                }],
            },
            generation_config: GenerationConfig { temperature },
        }
    }
}

// ============================================================================
// Response payload
// ============================================================================

/// One decoded SSE event from the streaming endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamEvent {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub error: Option<ErrorStatus>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

/// Error body shape shared by non-success responses and in-stream error
/// events.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub code: u16,
    pub message: String,
}

impl StreamEvent {
    /// Concatenated text of the first candidate's parts. `None` when the
    /// event carries no text, e.g. a bare finish event.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let mut out = String::new();
        for part in &content.parts {
            if let Some(text) = &part.text {
                out.push_str(text);
            }
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::request::ImageAttachment;

    #[test]
    fn test_request_payload_shape() {
        let request = GenerationRequest::new(
            "a pricing table",
            Some(ImageAttachment {
                mime_type: "image/png".to_string(),
                bytes: vec![1, 2, 3],
            }),
            Framework::Html,
        )
        .unwrap();

        let payload = GenerateContentRequest::build(&request, 0.2);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "a pricing table");
        assert_eq!(
            value["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(
            value["contents"][0]["parts"][1]["inlineData"]["data"],
            STANDARD.encode([1, 2, 3])
        );
        // The system instruction is a bare content object without a role.
        assert!(value["systemInstruction"].get("role").is_none());
        let temperature = value["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_stream_event_concatenates_parts() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"<div>"},{"text":"</div>"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(event.text().as_deref(), Some("<div></div>"));
    }

    #[test]
    fn test_finish_event_without_text_yields_none() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"candidates":[{"content":{"role":"model"},"finishReason":"STOP"}]}"#)
                .unwrap();
        assert!(event.text().is_none());
    }

    #[test]
    fn test_in_stream_error_event_parses() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#,
        )
        .unwrap();
        let error = event.error.unwrap();
        assert_eq!(error.code, 429);
        assert!(error.message.contains("exhausted"));
    }

    #[test]
    fn test_directive_selection() {
        assert_eq!(directive_for(Framework::Html), MARKUP_DIRECTIVE);
        assert_eq!(directive_for(Framework::React), COMPONENT_DIRECTIVE);
        assert_eq!(directive_for(Framework::NextJs), COMPONENT_DIRECTIVE);
        assert_eq!(directive_for(Framework::Vue), COMPONENT_DIRECTIVE);
        assert!(COMPONENT_DIRECTIVE.contains("useState"));
        assert!(MARKUP_DIRECTIVE.contains("No markdown"));
    }
}

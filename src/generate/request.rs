use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::warn;

use crate::generate::error::MalformedInputError;
use crate::preview::artifact::Framework;

/// A single user turn: prompt text, optional reference image, target framework.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ImageAttachment>,
    pub framework: Framework,
}

impl GenerationRequest {
    /// Builds a request, rejecting turns that carry neither prompt text nor
    /// an image.
    pub fn new(
        prompt: impl Into<String>,
        image: Option<ImageAttachment>,
        framework: Framework,
    ) -> Result<Self, MalformedInputError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() && image.is_none() {
            return Err(MalformedInputError::EmptyPrompt);
        }
        Ok(Self {
            prompt,
            image,
            framework,
        })
    }
}

/// Decoded image payload plus the MIME type declared by its data URI.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Parses a `data:` URI into decoded bytes.
    ///
    /// The declared MIME type always wins. The decoded bytes are sniffed and
    /// a disagreement with the declared type only logs a warning.
    pub fn from_data_uri(uri: &str) -> Result<Self, MalformedInputError> {
        let mime_type = infer_mime(uri).to_string();
        let (_, payload) = uri
            .split_once(',')
            .ok_or(MalformedInputError::MissingPayloadSeparator)?;
        if payload.is_empty() {
            return Err(MalformedInputError::EmptyPayload);
        }
        let bytes = STANDARD.decode(payload)?;

        if let Ok(format) = image::guess_format(&bytes) {
            let sniffed = format.to_mime_type();
            if sniffed != mime_type {
                warn!(
                    declared = %mime_type,
                    sniffed = %sniffed,
                    "Image MIME mismatch, keeping declared type"
                );
            }
        }

        Ok(Self { mime_type, bytes })
    }
}

/// MIME inference from the URI prefix. Unrecognized prefixes fall back to
/// JPEG.
fn infer_mime(uri: &str) -> &'static str {
    if uri.starts_with("data:image/png") {
        "image/png"
    } else if uri.starts_with("data:image/webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

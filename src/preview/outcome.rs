use thiserror::Error;

use crate::preview::artifact::Framework;
use crate::preview::component::ComponentTree;
use crate::preview::document::IsolatedDocument;

/// Result of routing one artifact revision through a renderer.
///
/// Produced fresh on every revision; the previous outcome is discarded, not
/// merged. There is no partial-success state.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    Rendered(RenderedSurface),
    Failed(RenderError),
}

impl ExecutionOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, ExecutionOutcome::Rendered(_))
    }
}

/// A successfully produced preview surface.
#[derive(Debug, Clone)]
pub enum RenderedSurface {
    /// A complete, privilege-restricted document (markup output).
    Document(IsolatedDocument),
    /// An evaluated component tree of intrinsic nodes.
    Tree(ComponentTree),
    /// The framework is recognized but rendering is deferred.
    Placeholder {
        framework: Framework,
        message: String,
    },
}

/// Failures contained by the renderers' error-isolating boundary.
///
/// These are expected user-level events (the source is AI-generated and
/// frequently mid-stream incomplete), reported through the session's error
/// channel rather than propagated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("`{name}` is not defined")]
    Reference { name: String },

    #[error("Hook misuse: {message}")]
    HookMisuse { message: String },

    #[error("State slot mismatch: {message}")]
    SlotMismatch { message: String },

    #[error("Evaluation error: {message}")]
    Eval { message: String },

    #[error("Dispatch failed: {message}")]
    Dispatch { message: String },

    #[error("Evaluation panicked: {message}")]
    Panic { message: String },
}

//! Sandboxed execution of generated, untrusted source.

pub mod artifact;
pub mod component;
pub mod document;
pub mod outcome;
pub mod router;
pub mod session;
pub mod viewport;

pub use artifact::{CodeArtifact, Framework};
pub use outcome::{ExecutionOutcome, RenderError, RenderedSurface};
pub use router::ExecutionRouter;
pub use session::{ChunkDisposition, PreviewSession, StreamTicket};
pub use viewport::ViewportPreset;

//! Streaming preview sessions.
//!
//! A session owns one artifact and re-executes it as chunks land. Each
//! generation pass gets a ticket; deliveries carrying a superseded ticket
//! are discarded so an abandoned stream can never clobber the artifact it
//! was replaced by.

use tracing::debug;

use crate::preview::artifact::{CodeArtifact, Framework};
use crate::preview::component::{HandlerId, Value};
use crate::preview::outcome::{ExecutionOutcome, RenderError, RenderedSurface};
use crate::preview::router::ExecutionRouter;
use crate::preview::viewport::ViewportPreset;

/// Names one generation pass within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTicket(u64);

/// What a session did with a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkDisposition {
    Applied,
    Stale,
}

pub struct PreviewSession {
    router: ExecutionRouter,
    artifact: CodeArtifact,
    current: u64,
    surface: Option<RenderedSurface>,
    render_error: Option<RenderError>,
    generation_error: Option<String>,
    viewport: ViewportPreset,
}

impl PreviewSession {
    pub fn new(router: ExecutionRouter) -> Self {
        Self {
            router,
            artifact: CodeArtifact::new(Framework::default()),
            current: 0,
            surface: None,
            render_error: None,
            generation_error: None,
            viewport: ViewportPreset::default(),
        }
    }

    /// Starts a new generation pass, invalidating every earlier ticket.
    /// The last rendered surface stays visible until the new pass renders.
    pub fn begin(&mut self, framework: Framework) -> StreamTicket {
        self.current += 1;
        self.artifact = CodeArtifact::new(framework);
        self.generation_error = None;
        debug!(pass = self.current, framework = %framework, "Starting generation pass");
        StreamTicket(self.current)
    }

    /// Appends a streamed chunk and re-executes the artifact.
    pub fn apply_chunk(&mut self, ticket: &StreamTicket, text: &str) -> ChunkDisposition {
        if self.is_stale(ticket) {
            return ChunkDisposition::Stale;
        }
        self.artifact.append(text);
        self.execute();
        ChunkDisposition::Applied
    }

    /// Replaces the artifact wholesale, for edits made in the code pane.
    pub fn replace(&mut self, ticket: &StreamTicket, content: &str) -> ChunkDisposition {
        if self.is_stale(ticket) {
            return ChunkDisposition::Stale;
        }
        self.artifact.replace_content(content);
        self.execute();
        ChunkDisposition::Applied
    }

    /// Marks the pass complete. The artifact already reflects every chunk,
    /// so nothing re-executes here.
    pub fn finish(&mut self, ticket: &StreamTicket) -> ChunkDisposition {
        if self.is_stale(ticket) {
            return ChunkDisposition::Stale;
        }
        debug!(
            pass = self.current,
            revision = self.artifact.revision,
            "Generation pass complete"
        );
        ChunkDisposition::Applied
    }

    /// Records a generation failure. The last rendered surface stays up;
    /// only the error banner changes.
    pub fn fail(&mut self, ticket: &StreamTicket, message: impl Into<String>) -> ChunkDisposition {
        if self.is_stale(ticket) {
            return ChunkDisposition::Stale;
        }
        self.generation_error = Some(message.into());
        ChunkDisposition::Applied
    }

    /// Evaluates the handler bound under `id` on the current tree.
    pub fn dispatch(&mut self, id: HandlerId) -> Result<(), RenderError> {
        let Some(RenderedSurface::Tree(tree)) = &self.surface else {
            return self.record(RenderError::Dispatch {
                message: "no component tree rendered".to_string(),
            });
        };
        match self.router.component().dispatch(tree, id, self.router.scope()) {
            Ok(()) => Ok(()),
            Err(error) => self.record(error),
        }
    }

    /// Writes a state slot and re-renders against the same hook store. A
    /// failed re-render leaves the previous tree in place.
    pub fn set_state(&mut self, slot: usize, value: Value) -> Result<(), RenderError> {
        let Some(RenderedSurface::Tree(tree)) = &self.surface else {
            return self.record(RenderError::Dispatch {
                message: "no component tree rendered".to_string(),
            });
        };
        let store = tree.store().clone();
        if let Err(error) = store.lock().set(slot, value) {
            return self.record(error);
        }

        let outcome =
            self.router
                .component()
                .render_with_store(&self.artifact.content, self.router.scope(), store);
        match outcome {
            ExecutionOutcome::Rendered(surface) => {
                self.surface = Some(surface);
                self.render_error = None;
                Ok(())
            }
            ExecutionOutcome::Failed(error) => self.record(error),
        }
    }

    pub fn rendered(&self) -> Option<&RenderedSurface> {
        self.surface.as_ref()
    }

    pub fn last_error(&self) -> Option<&RenderError> {
        self.render_error.as_ref()
    }

    pub fn generation_error(&self) -> Option<&str> {
        self.generation_error.as_deref()
    }

    pub fn artifact(&self) -> &CodeArtifact {
        &self.artifact
    }

    pub fn viewport(&self) -> ViewportPreset {
        self.viewport
    }

    pub fn set_viewport(&mut self, preset: ViewportPreset) {
        self.viewport = preset;
    }

    fn is_stale(&self, ticket: &StreamTicket) -> bool {
        if ticket.0 == self.current {
            return false;
        }
        debug!(
            ticket = ticket.0,
            current = self.current,
            "Discarding delivery for a superseded pass"
        );
        true
    }

    fn execute(&mut self) {
        match self.router.route(&self.artifact) {
            ExecutionOutcome::Rendered(surface) => {
                self.surface = Some(surface);
                self.render_error = None;
            }
            ExecutionOutcome::Failed(error) => {
                self.render_error = Some(error);
            }
        }
    }

    fn record(&mut self, error: RenderError) -> Result<(), RenderError> {
        self.render_error = Some(error.clone());
        Err(error)
    }
}

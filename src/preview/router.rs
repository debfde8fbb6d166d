//! Per-framework execution strategies.

use std::sync::Arc;

use crate::preview::artifact::{CodeArtifact, Framework};
use crate::preview::component::ComponentRenderer;
use crate::preview::document::render_document;
use crate::preview::outcome::{ExecutionOutcome, RenderedSurface};
use crate::scope::CapabilityScope;

const VUE_PLACEHOLDER: &str =
    "Vue Live Preview is deferred. Showing generated code in the editor.";

/// Dispatches an artifact to the execution strategy for its framework.
///
/// Routing is stateless: the outcome depends only on the artifact's kind
/// and content, never on earlier routes.
#[derive(Debug)]
pub struct ExecutionRouter {
    scope: Arc<CapabilityScope>,
    component: ComponentRenderer,
}

impl ExecutionRouter {
    pub fn new(scope: Arc<CapabilityScope>) -> Self {
        Self {
            scope,
            component: ComponentRenderer::new(),
        }
    }

    pub fn route(&self, artifact: &CodeArtifact) -> ExecutionOutcome {
        match artifact.kind {
            Framework::Html => ExecutionOutcome::Rendered(RenderedSurface::Document(
                render_document(&artifact.content),
            )),
            Framework::React | Framework::NextJs => {
                self.component.render(&artifact.content, &self.scope)
            }
            Framework::Vue => ExecutionOutcome::Rendered(RenderedSurface::Placeholder {
                framework: Framework::Vue,
                message: VUE_PLACEHOLDER.to_string(),
            }),
        }
    }

    pub(crate) fn component(&self) -> &ComponentRenderer {
        &self.component
    }

    pub(crate) fn scope(&self) -> &CapabilityScope {
        &self.scope
    }
}

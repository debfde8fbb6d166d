//! Component execution for the react and nextjs frameworks.
//!
//! Source is parsed and evaluated in-process. No script engine is
//! involved, so generated code can only reach what the capability scope
//! names.

mod eval;
mod parser;
mod tree;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::preview::component::eval::SlotStore;
use crate::preview::outcome::{ExecutionOutcome, RenderError, RenderedSurface};
use crate::scope::CapabilityScope;

pub use tree::{ComponentTree, HandlerBinding, HandlerId, Value};

/// Renders component source against a capability scope.
#[derive(Debug, Default)]
pub struct ComponentRenderer;

impl ComponentRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders unwrapped component source with a fresh hook store. Every
    /// failure mode lands in `ExecutionOutcome::Failed`; this never
    /// panics out to the caller.
    pub fn render(&self, component_source: &str, scope: &CapabilityScope) -> ExecutionOutcome {
        self.render_with_store(
            component_source,
            scope,
            Arc::new(Mutex::new(SlotStore::new())),
        )
    }

    /// Renders against an existing hook store so state set by earlier
    /// interactions survives the re-render.
    pub(crate) fn render_with_store(
        &self,
        component_source: &str,
        scope: &CapabilityScope,
        store: Arc<Mutex<SlotStore>>,
    ) -> ExecutionOutcome {
        let wrapped = wrap(component_source);
        let result = catch_unwind(AssertUnwindSafe(|| {
            let program = parser::parse_program(&wrapped)?;
            let mut guard = store.lock();
            eval::evaluate_program(&program, scope, &mut guard)
        }));
        match result {
            Ok(Ok((roots, bindings))) => {
                ExecutionOutcome::Rendered(RenderedSurface::Tree(ComponentTree::new(
                    roots, bindings, store,
                )))
            }
            Ok(Err(error)) => ExecutionOutcome::Failed(error),
            Err(panic) => ExecutionOutcome::Failed(RenderError::Panic {
                message: panic_message(&panic),
            }),
        }
    }

    /// Evaluates the handler bound under `id`. The tree itself is left
    /// untouched; callers re-render after mutating state.
    pub fn dispatch(
        &self,
        tree: &ComponentTree,
        id: HandlerId,
        scope: &CapabilityScope,
    ) -> Result<(), RenderError> {
        let binding = tree.handler(id).ok_or_else(|| RenderError::Dispatch {
            message: format!("no handler bound for id {id}"),
        })?;
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut guard = tree.store().lock();
            eval::evaluate_dispatch(&binding.expr, scope, &mut guard)
        }));
        match result {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(error)) => Err(error),
            Err(panic) => Err(RenderError::Panic {
                message: panic_message(&panic),
            }),
        }
    }
}

/// Wraps raw generated markup into a complete program rooted at a single
/// component, the shape the model is instructed to emit for.
fn wrap(source: &str) -> String {
    format!(
        "const PreviewRoot = () => {{ return (<Fragment>\n{source}\n</Fragment>); }};\nrender(<PreviewRoot/>);"
    )
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

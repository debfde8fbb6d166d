//! Preview pipeline tests, streamed source in, rendered surface out.

use std::sync::Arc;

use promptcanvas::preview::component::{HandlerId, Value};
use promptcanvas::preview::{
    ExecutionRouter, Framework, PreviewSession, RenderError, RenderedSurface,
};
use promptcanvas::scope::CapabilityScope;

fn session() -> PreviewSession {
    PreviewSession::new(ExecutionRouter::new(Arc::new(CapabilityScope::standard())))
}

#[test]
fn hostile_markup_renders_without_privilege_grants() {
    let mut session = session();
    let ticket = session.begin(Framework::Html);
    session.apply_chunk(
        &ticket,
        "<script>window.localStorage.setItem('stolen', document.cookie)</script>",
    );

    let document = match session.rendered() {
        Some(RenderedSurface::Document(document)) => document,
        other => panic!("Expected a document, got: {other:?}"),
    };
    assert!(document.html.contains("localStorage.setItem"));
    assert!(document.sandbox.permits("allow-scripts"));
    assert!(!document.sandbox.permits("allow-same-origin"));
    assert!(!document.sandbox.permits("allow-top-navigation"));
    assert!(!document.sandbox.permits("allow-forms"));
    assert_eq!(document.sandbox.attribute(), "allow-scripts");
}

#[test]
fn component_failure_then_valid_revision_clears_the_error() {
    let mut session = session();
    let ticket = session.begin(Framework::React);

    session.apply_chunk(&ticket, "<div>{renderChart()}</div>");
    match session.last_error() {
        Some(RenderError::Reference { name }) => assert_eq!(name, "renderChart"),
        other => panic!("Expected a reference error, got: {other:?}"),
    }
    assert!(!session.last_error().unwrap().to_string().is_empty());
    assert!(session.rendered().is_none());

    session.replace(&ticket, "<div>ready</div>");
    assert!(session.last_error().is_none());
    match session.rendered() {
        Some(RenderedSurface::Tree(tree)) => assert_eq!(tree.to_html(), "<div>ready</div>"),
        other => panic!("Expected a rendered tree, got: {other:?}"),
    }
}

#[test]
fn unknown_capability_is_reported_by_name() {
    let mut session = session();
    let ticket = session.begin(Framework::React);
    session.apply_chunk(&ticket, "<Unknown/>");

    match session.last_error() {
        Some(RenderError::Reference { name }) => {
            assert_eq!(name, "Unknown");
        }
        other => panic!("Expected a reference error, got: {other:?}"),
    }
    assert_eq!(
        session.last_error().unwrap().to_string(),
        "`Unknown` is not defined"
    );
}

#[test]
fn counter_card_renders_dispatches_and_updates() {
    let mut session = session();
    let ticket = session.begin(Framework::React);
    session.apply_chunk(
        &ticket,
        r#"<div className="p-6"><span>{useState(0)}</span><Button variant="primary" onClick="increment">Add</Button></div>"#,
    );

    let (html, handler) = match session.rendered() {
        Some(RenderedSurface::Tree(tree)) => (tree.to_html(), tree.handlers()[0].id),
        other => panic!("Expected a rendered tree, got: {other:?}"),
    };
    assert!(html.contains(r#"<div class="p-6">"#), "{html}");
    assert!(html.contains("<span>0</span>"), "{html}");
    assert!(html.contains(r#"data-variant="primary""#), "{html}");
    assert!(html.contains("data-handler-click"), "{html}");

    session.dispatch(handler).unwrap();
    session.set_state(0, Value::Num(1.0)).unwrap();

    match session.rendered() {
        Some(RenderedSurface::Tree(tree)) => {
            assert!(tree.to_html().contains("<span>1</span>"));
        }
        other => panic!("Expected a rendered tree, got: {other:?}"),
    }
}

#[test]
fn dispatching_an_unbound_handler_fails() {
    let mut session = session();
    let ticket = session.begin(Framework::React);
    session.apply_chunk(&ticket, "<div>static</div>");

    match session.dispatch(HandlerId::default()) {
        Err(RenderError::Dispatch { message }) => {
            assert!(message.contains("no handler"), "{message}");
        }
        other => panic!("Expected a dispatch failure, got: {other:?}"),
    }
}

#[test]
fn vue_artifacts_keep_their_code_behind_a_placeholder() {
    let mut session = session();
    let ticket = session.begin(Framework::Vue);
    session.apply_chunk(&ticket, "<template><div>app</div></template>");

    match session.rendered() {
        Some(RenderedSurface::Placeholder { framework, message }) => {
            assert_eq!(*framework, Framework::Vue);
            assert!(message.contains("deferred"), "{message}");
        }
        other => panic!("Expected a placeholder, got: {other:?}"),
    }
    assert_eq!(
        session.artifact().content,
        "<template><div>app</div></template>"
    );
}

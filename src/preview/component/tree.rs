//! Evaluated component trees and the values flowing through them.

use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::preview::component::eval::SlotStore;
use crate::preview::component::parser::Expr;

/// Runtime value of the component dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Value {
    /// Text this value contributes to rendered output. `Null` and booleans
    /// contribute nothing, matching how JSX treats them as children.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::Bool(_) => None,
            Value::Num(n) => Some(format_number(*n)),
            Value::Str(s) => Some(s.clone()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Identifies one recorded handler binding within a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HandlerId(pub(crate) u64);

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An event handler recorded during render. The expression stays
/// unevaluated until the handler is dispatched.
#[derive(Debug, Clone)]
pub struct HandlerBinding {
    pub event: String,
    pub id: HandlerId,
    pub(crate) expr: Expr,
}

/// One node of an evaluated tree. Capability elements are already expanded;
/// only intrinsic tags and text remain.
#[derive(Debug, Clone)]
pub enum VNode {
    Element {
        tag: String,
        attrs: Vec<(String, Value)>,
        handlers: Vec<(String, HandlerId)>,
        children: Vec<VNode>,
    },
    Text(String),
}

/// A rendered component surface: root nodes, handler bindings, and the
/// hook store shared with later renders of the same artifact revision.
#[derive(Debug, Clone)]
pub struct ComponentTree {
    roots: Vec<VNode>,
    bindings: Vec<HandlerBinding>,
    store: Arc<Mutex<SlotStore>>,
}

impl ComponentTree {
    pub(crate) fn new(
        roots: Vec<VNode>,
        bindings: Vec<HandlerBinding>,
        store: Arc<Mutex<SlotStore>>,
    ) -> Self {
        Self {
            roots,
            bindings,
            store,
        }
    }

    pub fn handlers(&self) -> &[HandlerBinding] {
        &self.bindings
    }

    pub fn handler(&self, id: HandlerId) -> Option<&HandlerBinding> {
        self.bindings.iter().find(|binding| binding.id == id)
    }

    /// Effects queued by the render that produced this tree.
    pub fn queued_effects(&self) -> Vec<Value> {
        self.store.lock().effects().to_vec()
    }

    pub(crate) fn store(&self) -> &Arc<Mutex<SlotStore>> {
        &self.store
    }

    /// Serializes the tree to markup. Handler bindings surface as
    /// `data-handler-{event}` attributes carrying the binding id.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            write_node(&mut out, root);
        }
        out
    }
}

fn write_node(out: &mut String, node: &VNode) {
    match node {
        VNode::Text(text) => out.push_str(&escape_text(text)),
        VNode::Element {
            tag,
            attrs,
            handlers,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                match value {
                    Value::Null | Value::Bool(false) => {}
                    Value::Bool(true) => {
                        out.push(' ');
                        out.push_str(name);
                    }
                    Value::Num(n) => push_attr(out, name, &format_number(*n)),
                    Value::Str(s) => push_attr(out, name, s),
                }
            }
            for (event, id) in handlers {
                let _ = write!(out, " data-handler-{event}=\"{id}\"");
            }
            if is_void(tag) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in children {
                write_node(out, child);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "input" | "meta" | "link")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

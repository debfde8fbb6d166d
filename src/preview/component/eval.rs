//! Scoped evaluation of parsed component programs.
//!
//! Free identifiers resolve against the capability scope and wrapper-local
//! component definitions only; nothing else is visible to untrusted source.
//! Hooks are render-phase callables over a call-order slot store that
//! persists across interactions within one artifact revision.

use std::collections::HashMap;

use crate::preview::component::parser::{Attr, AttrValue, Expr, JsxNode, Program, Stmt};
use crate::preview::component::tree::{HandlerBinding, HandlerId, VNode, Value};
use crate::preview::outcome::RenderError;
use crate::scope::{Atom, Capability, CapabilityScope, Hook};

/// Nested component expansions allowed before evaluation gives up, so a
/// self-referencing definition cannot overflow the stack.
const MAX_COMPONENT_DEPTH: usize = 64;

/// Utility classes applied to every expanded `Button` atom.
const BUTTON_CLASSES: &str = "inline-flex items-center justify-center rounded-md \
text-sm font-medium bg-blue-600 text-white hover:bg-blue-700 h-10 px-4 py-2";

// ============================================================================
// Slot store
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotKind {
    State,
    Effect,
    Ref,
    Memo,
    Callback,
}

impl SlotKind {
    fn of(hook: Hook) -> Self {
        match hook {
            Hook::State => SlotKind::State,
            Hook::Effect => SlotKind::Effect,
            Hook::Ref => SlotKind::Ref,
            Hook::Memo => SlotKind::Memo,
            Hook::Callback => SlotKind::Callback,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            SlotKind::State => "state",
            SlotKind::Effect => "effect",
            SlotKind::Ref => "ref",
            SlotKind::Memo => "memo",
            SlotKind::Callback => "callback",
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    kind: SlotKind,
    value: Value,
}

/// Call-order hook storage for one artifact revision.
///
/// The first completed render seals the slot shape; every later render of
/// the same store must claim the same sequence of kinds. Queued effects are
/// discarded at the start of each render.
#[derive(Debug, Default)]
pub(crate) struct SlotStore {
    slots: Vec<Slot>,
    cursor: usize,
    effects: Vec<Value>,
    sealed: bool,
}

impl SlotStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn begin_render(&mut self) {
        self.cursor = 0;
        self.effects.clear();
    }

    fn end_render(&mut self) -> Result<(), RenderError> {
        if self.sealed && self.cursor != self.slots.len() {
            return Err(RenderError::SlotMismatch {
                message: format!(
                    "render claimed {} slots, previous render claimed {}",
                    self.cursor,
                    self.slots.len()
                ),
            });
        }
        self.sealed = true;
        Ok(())
    }

    fn claim(&mut self, kind: SlotKind, initial: Value) -> Result<Value, RenderError> {
        if let Some(slot) = self.slots.get(self.cursor) {
            if slot.kind != kind {
                return Err(RenderError::SlotMismatch {
                    message: format!(
                        "slot {} was a {} slot, now claimed as {}",
                        self.cursor,
                        slot.kind.describe(),
                        kind.describe()
                    ),
                });
            }
            let value = slot.value.clone();
            self.cursor += 1;
            return Ok(value);
        }

        if self.sealed {
            return Err(RenderError::SlotMismatch {
                message: format!(
                    "render claimed more slots than the previous render ({})",
                    self.slots.len()
                ),
            });
        }
        self.slots.push(Slot {
            kind,
            value: initial.clone(),
        });
        self.cursor += 1;
        Ok(initial)
    }

    fn queue_effect(&mut self, value: Value) {
        self.effects.push(value);
    }

    pub(crate) fn effects(&self) -> &[Value] {
        &self.effects
    }

    /// Overwrites the value of a state slot. Interaction entry point for
    /// `PreviewSession::set_state`.
    pub(crate) fn set(&mut self, index: usize, value: Value) -> Result<(), RenderError> {
        match self.slots.get_mut(index) {
            None => Err(RenderError::SlotMismatch {
                message: format!("no slot at position {index}"),
            }),
            Some(slot) if slot.kind != SlotKind::State => Err(RenderError::SlotMismatch {
                message: format!(
                    "slot {index} is a {} slot, not a state slot",
                    slot.kind.describe()
                ),
            }),
            Some(slot) => {
                slot.value = value;
                Ok(())
            }
        }
    }
}

// ============================================================================
// Evaluator
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Render,
    Dispatch,
}

/// Evaluates a whole program into root nodes plus the handler bindings
/// recorded along the way.
pub(crate) fn evaluate_program(
    program: &Program,
    scope: &CapabilityScope,
    store: &mut SlotStore,
) -> Result<(Vec<VNode>, Vec<HandlerBinding>), RenderError> {
    let mut components: HashMap<&str, &JsxNode> = HashMap::new();
    for stmt in &program.stmts {
        if let Stmt::ComponentDef { name, body } = stmt {
            if components.insert(name.as_str(), body).is_some() {
                return Err(RenderError::Eval {
                    message: format!("`{name}` is defined more than once"),
                });
            }
        }
    }

    store.begin_render();
    let mut evaluator = Evaluator {
        scope,
        store,
        phase: Phase::Render,
        components,
        handlers: Vec::new(),
        next_handler: 0,
        depth: 0,
    };

    let mut roots = Vec::new();
    for stmt in &program.stmts {
        if let Stmt::Render { node } = stmt {
            roots.extend(evaluator.eval_node(node)?);
        }
    }

    let handlers = evaluator.handlers;
    store.end_render()?;
    Ok((roots, handlers))
}

/// Evaluates one recorded handler expression outside the render phase.
pub(crate) fn evaluate_dispatch(
    expr: &Expr,
    scope: &CapabilityScope,
    store: &mut SlotStore,
) -> Result<Value, RenderError> {
    let mut evaluator = Evaluator {
        scope,
        store,
        phase: Phase::Dispatch,
        components: HashMap::new(),
        handlers: Vec::new(),
        next_handler: 0,
        depth: 0,
    };
    evaluator.eval_expr(expr)
}

struct Evaluator<'a> {
    scope: &'a CapabilityScope,
    store: &'a mut SlotStore,
    phase: Phase,
    components: HashMap<&'a str, &'a JsxNode>,
    handlers: Vec<HandlerBinding>,
    next_handler: u64,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    fn eval_node(&mut self, node: &'a JsxNode) -> Result<Vec<VNode>, RenderError> {
        match node {
            JsxNode::Text(text) => Ok(vec![VNode::Text(text.clone())]),
            JsxNode::Expr(expr) => {
                let value = self.eval_expr(expr)?;
                Ok(match value.as_text() {
                    Some(text) => vec![VNode::Text(text)],
                    None => Vec::new(),
                })
            }
            JsxNode::Fragment { children } => self.eval_children(children),
            JsxNode::Element {
                tag,
                attrs,
                children,
            } => self.eval_element(tag, attrs, children),
        }
    }

    fn eval_children(&mut self, children: &'a [JsxNode]) -> Result<Vec<VNode>, RenderError> {
        let mut out = Vec::new();
        for child in children {
            out.extend(self.eval_node(child)?);
        }
        Ok(out)
    }

    fn eval_intrinsic(
        &mut self,
        tag: &str,
        attrs: &'a [Attr],
        children: &'a [JsxNode],
    ) -> Result<VNode, RenderError> {
        let (attrs, handlers) = self.eval_attrs(attrs)?;
        let children = self.eval_children(children)?;
        Ok(VNode::Element {
            tag: tag.to_string(),
            attrs,
            handlers,
            children,
        })
    }

    fn eval_element(
        &mut self,
        tag: &'a str,
        attrs: &'a [Attr],
        children: &'a [JsxNode],
    ) -> Result<Vec<VNode>, RenderError> {
        // Wrapper-local definitions shadow scope entries.
        if let Some(body) = self.components.get(tag).copied() {
            if self.depth >= MAX_COMPONENT_DEPTH {
                return Err(RenderError::Eval {
                    message: format!("component nesting exceeds {MAX_COMPONENT_DEPTH} levels"),
                });
            }
            self.depth += 1;
            let result = self.eval_node(body);
            self.depth -= 1;
            return result;
        }

        match self.scope.lookup(tag) {
            Some(Capability::Fragment) => self.eval_children(children),
            Some(Capability::Atom(Atom::Button)) => {
                Ok(vec![self.expand_button(attrs, children)?])
            }
            Some(Capability::Hook(hook)) => Err(RenderError::Eval {
                message: format!("`{}` is a hook and cannot be used as an element", hook.name()),
            }),
            None if is_intrinsic(tag) => Ok(vec![self.eval_intrinsic(tag, attrs, children)?]),
            None => Err(RenderError::Reference {
                name: tag.to_string(),
            }),
        }
    }

    /// Expands the `Button` atom to an intrinsic `<button>`: fixed utility
    /// classes, `data-variant` reflecting the `variant` attr, everything
    /// else passed through.
    fn expand_button(
        &mut self,
        attrs: &'a [Attr],
        children: &'a [JsxNode],
    ) -> Result<VNode, RenderError> {
        let (evaluated, handlers) = self.eval_attrs(attrs)?;

        let mut class = BUTTON_CLASSES.to_string();
        let mut variant = None;
        let mut passthrough = Vec::new();
        for (name, value) in evaluated {
            match name.as_str() {
                "variant" => variant = value.as_text(),
                "class" => {
                    if let Some(extra) = value.as_text() {
                        class.push(' ');
                        class.push_str(&extra);
                    }
                }
                _ => passthrough.push((name, value)),
            }
        }

        let mut out_attrs = vec![("class".to_string(), Value::Str(class))];
        if let Some(variant) = variant {
            out_attrs.push(("data-variant".to_string(), Value::Str(variant)));
        }
        out_attrs.extend(passthrough);

        let children = self.eval_children(children)?;
        Ok(VNode::Element {
            tag: "button".to_string(),
            attrs: out_attrs,
            handlers,
            children,
        })
    }

    /// Splits attributes into evaluated values and recorded handler
    /// bindings. Handler expressions are not evaluated here.
    #[allow(clippy::type_complexity)]
    fn eval_attrs(
        &mut self,
        attrs: &'a [Attr],
    ) -> Result<(Vec<(String, Value)>, Vec<(String, HandlerId)>), RenderError> {
        let mut values = Vec::new();
        let mut handlers = Vec::new();
        for attr in attrs {
            if let Some(event) = handler_event(&attr.name) {
                let expr = match &attr.value {
                    AttrValue::Expr(expr) => expr.clone(),
                    AttrValue::Literal(text) => Expr::Str(text.clone()),
                    AttrValue::Flag => Expr::Bool(true),
                };
                let id = HandlerId(self.next_handler);
                self.next_handler += 1;
                self.handlers.push(HandlerBinding {
                    event: event.clone(),
                    id,
                    expr,
                });
                handlers.push((event, id));
            } else {
                let value = match &attr.value {
                    AttrValue::Literal(text) => Value::Str(text.clone()),
                    AttrValue::Flag => Value::Bool(true),
                    AttrValue::Expr(expr) => self.eval_expr(expr)?,
                };
                values.push((normalize_attr_name(&attr.name), value));
            }
        }
        Ok((values, handlers))
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RenderError> {
        match expr {
            Expr::Str(text) => Ok(Value::Str(text.clone())),
            Expr::Num(n) => Ok(Value::Num(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Ident(name) => {
                if self.components.contains_key(name.as_str()) {
                    return Err(RenderError::Eval {
                        message: format!("`{name}` is a component, not a value"),
                    });
                }
                match self.scope.lookup(name) {
                    Some(_) => Err(RenderError::Eval {
                        message: format!("`{name}` is a capability, not a value"),
                    }),
                    None => Err(RenderError::Reference { name: name.clone() }),
                }
            }
            Expr::Call { callee, args } => match self.scope.lookup(callee) {
                Some(Capability::Hook(hook)) => self.call_hook(hook, args),
                Some(_) => Err(RenderError::Eval {
                    message: format!("`{callee}` is a component and cannot be called"),
                }),
                None if self.components.contains_key(callee.as_str()) => {
                    Err(RenderError::Eval {
                        message: format!("`{callee}` is a component and cannot be called"),
                    })
                }
                None => Err(RenderError::Reference {
                    name: callee.clone(),
                }),
            },
        }
    }

    fn call_hook(&mut self, hook: Hook, args: &[Expr]) -> Result<Value, RenderError> {
        if self.phase == Phase::Dispatch {
            return Err(RenderError::HookMisuse {
                message: format!("`{}` called outside the render phase", hook.name()),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        let initial = values.into_iter().next().unwrap_or(Value::Null);

        match hook {
            Hook::Effect => {
                self.store.claim(SlotKind::Effect, Value::Null)?;
                self.store.queue_effect(initial);
                Ok(Value::Null)
            }
            other => self.store.claim(SlotKind::of(other), initial),
        }
    }
}

fn is_intrinsic(tag: &str) -> bool {
    tag.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

/// `onClick` → `click`; names without the JSX handler shape are ordinary
/// attributes.
fn handler_event(name: &str) -> Option<String> {
    let rest = name.strip_prefix("on")?;
    let first = rest.chars().next()?;
    if first.is_ascii_uppercase() {
        Some(rest.to_lowercase())
    } else {
        None
    }
}

/// JSX spellings mapped to their markup names.
fn normalize_attr_name(name: &str) -> String {
    match name {
        "className" => "class".to_string(),
        "htmlFor" => "for".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::component::parser::parse_program;

    fn eval(source: &str) -> Result<(Vec<VNode>, Vec<HandlerBinding>), RenderError> {
        let program = parse_program(source).unwrap();
        let scope = CapabilityScope::standard();
        let mut store = SlotStore::new();
        evaluate_program(&program, &scope, &mut store)
    }

    #[test]
    fn unknown_capability_is_a_reference_error() {
        let err = eval("render(<Unknown/>);").unwrap_err();
        match err {
            RenderError::Reference { name } => assert_eq!(name, "Unknown"),
            other => panic!("Expected a reference error, got: {other:?}"),
        }
        assert_eq!(
            eval("render(<Unknown/>);").unwrap_err().to_string(),
            "`Unknown` is not defined"
        );
    }

    #[test]
    fn fragment_flattens_children() {
        let (roots, _) = eval("render(<Fragment><i>a</i><i>b</i></Fragment>);").unwrap();
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn state_slots_persist_across_renders_of_one_store() {
        let program = parse_program("render(<span>{useState(1)}</span>);").unwrap();
        let scope = CapabilityScope::standard();
        let mut store = SlotStore::new();

        let (roots, _) = evaluate_program(&program, &scope, &mut store).unwrap();
        assert!(matches!(&roots[0], VNode::Element { children, .. }
            if matches!(&children[0], VNode::Text(t) if t == "1")));

        store.set(0, Value::Num(5.0)).unwrap();
        let (roots, _) = evaluate_program(&program, &scope, &mut store).unwrap();
        assert!(matches!(&roots[0], VNode::Element { children, .. }
            if matches!(&children[0], VNode::Text(t) if t == "5")));
    }

    #[test]
    fn slot_shape_mismatch_is_detected() {
        let scope = CapabilityScope::standard();
        let mut store = SlotStore::new();

        let first = parse_program("render(<i>{useState(1)}</i>);").unwrap();
        evaluate_program(&first, &scope, &mut store).unwrap();

        let second = parse_program("render(<i>{useRef(1)}</i>);").unwrap();
        let err = evaluate_program(&second, &scope, &mut store).unwrap_err();
        assert!(matches!(err, RenderError::SlotMismatch { .. }));
    }

    #[test]
    fn set_state_rejects_non_state_slots() {
        let program = parse_program("render(<i>{useRef(1)}</i>);").unwrap();
        let scope = CapabilityScope::standard();
        let mut store = SlotStore::new();
        evaluate_program(&program, &scope, &mut store).unwrap();

        assert!(matches!(
            store.set(0, Value::Num(2.0)),
            Err(RenderError::SlotMismatch { .. })
        ));
        assert!(matches!(
            store.set(9, Value::Null),
            Err(RenderError::SlotMismatch { .. })
        ));
    }

    #[test]
    fn effects_are_queued_fresh_per_render() {
        let program = parse_program("render(<i>{useEffect(\"tick\")}</i>);").unwrap();
        let scope = CapabilityScope::standard();
        let mut store = SlotStore::new();

        evaluate_program(&program, &scope, &mut store).unwrap();
        assert_eq!(store.effects(), &[Value::Str("tick".to_string())]);

        evaluate_program(&program, &scope, &mut store).unwrap();
        assert_eq!(store.effects().len(), 1);
    }

    #[test]
    fn handlers_are_recorded_unevaluated() {
        // `missing` is not in scope; recording must still succeed because
        // handler expressions are only evaluated at dispatch time.
        let (roots, handlers) = eval("render(<button onClick={missing()}>go</button>);").unwrap();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].event, "click");
        assert!(matches!(&roots[0], VNode::Element { handlers, .. } if handlers.len() == 1));
    }

    #[test]
    fn dispatch_phase_rejects_hook_calls() {
        let scope = CapabilityScope::standard();
        let mut store = SlotStore::new();
        let expr = Expr::Call {
            callee: "useState".to_string(),
            args: vec![Expr::Num(0.0)],
        };
        let err = evaluate_dispatch(&expr, &scope, &mut store).unwrap_err();
        assert!(matches!(err, RenderError::HookMisuse { .. }));
    }

    #[test]
    fn button_atom_expands_to_intrinsic_markup() {
        let (roots, _) =
            eval(r#"render(<Button variant="primary" id="cta">Get started</Button>);"#).unwrap();
        let VNode::Element { tag, attrs, .. } = &roots[0] else {
            panic!("Expected an element root");
        };
        assert_eq!(tag, "button");
        assert!(matches!(&attrs[0], (name, Value::Str(classes))
            if name == "class" && classes.contains("inline-flex")));
        assert!(attrs.iter().any(|(name, value)| name == "data-variant"
            && matches!(value, Value::Str(v) if v == "primary")));
        assert!(attrs.iter().any(|(name, _)| name == "id"));
    }

    #[test]
    fn self_referencing_component_hits_the_depth_limit() {
        let err = eval(
            "const Loop = () => { return (<Loop/>); };\nrender(<Loop/>);",
        )
        .unwrap_err();
        match err {
            RenderError::Eval { message } => assert!(message.contains("nesting"), "{message}"),
            other => panic!("Expected an eval error, got: {other:?}"),
        }
    }

    #[test]
    fn classname_maps_to_class() {
        let (roots, _) = eval(r#"render(<div className="p-4"/>);"#).unwrap();
        assert!(matches!(&roots[0], VNode::Element { attrs, .. }
            if attrs[0].0 == "class"));
    }

    #[test]
    fn null_and_boolean_children_render_nothing() {
        let (roots, _) = eval("render(<div>{null}{true}{false}{0}</div>);").unwrap();
        let VNode::Element { children, .. } = &roots[0] else {
            panic!("Expected an element root");
        };
        assert_eq!(children.len(), 1);
        assert!(matches!(&children[0], VNode::Text(t) if t == "0"));
    }
}

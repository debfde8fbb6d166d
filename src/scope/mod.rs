//! Capability Scope Registry.
//!
//! The fixed set of names that generated component code may reference during
//! evaluation. The scope is the only name source the evaluator consults for
//! free identifiers; anything outside it fails with a reference error instead
//! of resolving against the host's own namespace.

/// Version of the exposed capability set.
///
/// Adding or removing a name is a compatibility-affecting change and must
/// bump this constant; the health endpoint reports it for shell probes.
pub const SCOPE_VERSION: u32 = 1;

/// What a scope name resolves to during component evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Grouping element that renders its children without a wrapper node.
    Fragment,
    /// UI atom expanded to intrinsic markup in the output tree.
    Atom(Atom),
    /// Render-phase callable backed by a call-order slot.
    Hook(Hook),
}

/// Scope-provided UI atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atom {
    Button,
}

/// Scope-provided state/effect primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    State,
    Effect,
    Ref,
    Memo,
    Callback,
}

impl Hook {
    /// The name the hook is exposed under.
    pub fn name(&self) -> &'static str {
        match self {
            Hook::State => "useState",
            Hook::Effect => "useEffect",
            Hook::Ref => "useRef",
            Hook::Memo => "useMemo",
            Hook::Callback => "useCallback",
        }
    }
}

/// Immutable name → capability table handed to every renderer invocation.
///
/// Constructed once at process start and shared read-only (`Arc`); the struct
/// exposes no way to add or remove an entry after construction.
#[derive(Debug)]
pub struct CapabilityScope {
    entries: Vec<(&'static str, Capability)>,
}

impl CapabilityScope {
    /// The standard scope, version [`SCOPE_VERSION`].
    pub fn standard() -> Self {
        Self {
            entries: vec![
                ("Fragment", Capability::Fragment),
                ("Button", Capability::Atom(Atom::Button)),
                ("useState", Capability::Hook(Hook::State)),
                ("useEffect", Capability::Hook(Hook::Effect)),
                ("useRef", Capability::Hook(Hook::Ref)),
                ("useMemo", Capability::Hook(Hook::Memo)),
                ("useCallback", Capability::Hook(Hook::Callback)),
            ],
        }
    }

    /// Resolve a name against the scope.
    pub fn lookup(&self, name: &str) -> Option<Capability> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, capability)| *capability)
    }

    /// Whether the scope exposes `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// All exposed names, sorted for stable display.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> =
            self.entries.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }
}

impl Default for CapabilityScope {
    fn default() -> Self {
        Self::standard()
    }
}

use std::fmt;

/// Target dialect declared for a generated artifact.
///
/// Supplied by the user-visible framework selector, never inferred from
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Framework {
    #[default]
    Html,
    React,
    NextJs,
    Vue,
}

impl Framework {
    /// Parse the wire-format name (`html`, `react`, `nextjs`, `vue`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "html" => Some(Framework::Html),
            "react" => Some(Framework::React),
            "nextjs" => Some(Framework::NextJs),
            "vue" => Some(Framework::Vue),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Html => "html",
            Framework::React => "react",
            Framework::NextJs => "nextjs",
            Framework::Vue => "vue",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated source text plus the dialect it targets.
///
/// Owned exclusively by the preview session; renderers only ever see
/// read-only snapshots. Every content mutation bumps `revision`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeArtifact {
    pub content: String,
    pub kind: Framework,
    pub revision: u64,
}

impl CodeArtifact {
    /// An empty artifact at revision 0.
    pub fn new(kind: Framework) -> Self {
        Self {
            content: String::new(),
            kind,
            revision: 0,
        }
    }

    /// An artifact seeded with content, still at revision 0.
    pub fn with_content(kind: Framework, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind,
            revision: 0,
        }
    }

    /// Append a streamed fragment.
    pub fn append(&mut self, text: &str) {
        self.content.push_str(text);
        self.revision += 1;
    }

    /// Replace the whole content (editor round-trips).
    pub fn replace_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.revision += 1;
    }
}

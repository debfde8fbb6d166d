//! Document pipeline: wraps generated markup in a complete sandboxed HTML
//! document.
//!
//! Generated code sometimes arrives with JSX-style comments even when plain
//! markup was requested; those are rewritten to HTML comments so they do not
//! leak as visible text. The markup itself is injected verbatim.

use std::sync::OnceLock;

use regex::Regex;

/// Script execution grants for an isolated document.
///
/// The document runs scripts but is denied same-origin access, so generated
/// code cannot reach the host page or its storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxPolicy {
    grants: Vec<&'static str>,
}

impl SandboxPolicy {
    /// The only policy the preview engine hands out: scripts allowed,
    /// everything else withheld.
    pub fn isolated_scripts() -> Self {
        Self {
            grants: vec!["allow-scripts"],
        }
    }

    pub fn permits(&self, grant: &str) -> bool {
        self.grants.iter().any(|g| *g == grant)
    }

    /// Value for an iframe `sandbox` attribute.
    pub fn attribute(&self) -> String {
        self.grants.join(" ")
    }
}

/// A complete HTML document ready to host in a sandboxed frame.
#[derive(Debug, Clone)]
pub struct IsolatedDocument {
    pub html: String,
    pub sandbox: SandboxPolicy,
}

/// Wraps generated markup in the preview document shell. Never fails: any
/// text is a valid document body.
pub fn render_document(source: &str) -> IsolatedDocument {
    let body = rewrite_jsx_comments(source);
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>promptcanvas preview</title>
<script src="https://cdn.tailwindcss.com"></script>
<style>
  body {{ margin: 0; padding: 0; height: 100vh; background-color: white; }}
</style>
</head>
<body>
{body}
</body>
</html>"#
    );

    IsolatedDocument {
        html,
        sandbox: SandboxPolicy::isolated_scripts(),
    }
}

fn jsx_comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\s*/\*\s*(.*?)\s*\*/\s*\}").expect("invalid JSX comment pattern")
    })
}

/// Rewrites `{/* ... */}` comments to `<!-- ... -->` so stray JSX annotations
/// do not render as literal text.
fn rewrite_jsx_comments(source: &str) -> String {
    jsx_comment_pattern()
        .replace_all(source, "<!-- $1 -->")
        .to_string()
}

//! promptcanvas: prompt-to-UI generation with a sandboxed live preview.
//!
//! The crate has two halves. The generation half (`generate`) turns a
//! multimodal prompt into an incremental token stream from the Gemini
//! `streamGenerateContent` API, normalizing provider failures into a stable
//! error contract. The preview half (`preview` + `scope`) takes the streamed,
//! untrusted source text and renders it live: markup inside a fully
//! privilege-restricted document, component-style source through a
//! capability-scoped evaluator behind an error-isolating boundary.
//!
//! `server` exposes the generation endpoint over HTTP for the hosting shell.

pub mod config;
pub mod generate;
pub mod preview;
pub mod scope;
pub mod server;
pub mod shutdown;

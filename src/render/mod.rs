//! # Render Sandbox
//!
//! Wraps substituted flyer markup in a standalone document and tracks how the
//! preview of that document is scaled into its container.
//!
//! ## Pipeline
//!
//! ```text
//! markup ──compose()──▶ ComposedDocument ──served with sandbox CSP──▶ <iframe sandbox>
//!                                               │
//!                              Viewport::observe(container width) ─▶ scale(W / Cw)
//! ```
//!
//! The composed document is always exactly `width × height` pixels; the
//! preview only applies a visual `transform: scale(...)` with a top-left
//! origin, so the full canvas stays visible without touching the document.

mod viewport;

pub use viewport::{ViewState, Viewport};

use crate::flyer::CanvasDimensions;

/// Id of the node that holds the flyer inside a composed document.
pub const ROOT_NODE_ID: &str = "flyer-container";

/// The single styling dependency available to generated markup.
pub const STYLE_SCRIPT_URL: &str = "https://cdn.tailwindcss.com";

/// Response header isolating the document from the host origin.
/// Scripts may run (the styling runtime needs them) but same-origin access does not exist.
pub const SANDBOX_CSP: &str = "sandbox allow-scripts";

/// `sandbox` attribute the host page must put on the preview iframe.
pub const IFRAME_SANDBOX: &str = "allow-scripts";

/// A full standalone document ready for preview or rasterization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedDocument {
    pub html: String,
    pub dimensions: CanvasDimensions,
}

impl ComposedDocument {
    /// Whether the root node the exporter captures is present.
    pub fn has_root_node(&self) -> bool {
        self.html.contains(&format!("id=\"{}\"", ROOT_NODE_ID))
    }
}

/// Wrap already-substituted markup in a sized, styled document.
pub fn compose(markup: &str, dimensions: CanvasDimensions) -> ComposedDocument {
    let CanvasDimensions { width, height } = dimensions;
    let html = format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <script src="{script}"></script>
  </head>
  <body style="margin: 0;">
    <div id="{root}" style="width: {width}px; height: {height}px;">
{markup}
    </div>
  </body>
</html>
"#,
        script = STYLE_SCRIPT_URL,
        root = ROOT_NODE_ID,
    );
    ComposedDocument { html, dimensions }
}

/// Markup shown before the first generation.
pub const WELCOME_FRAGMENT: &str = r#"<div class="flex items-center justify-center h-full bg-gray-100"><p>Click "Generate Flyer" to start!</p></div>"#;

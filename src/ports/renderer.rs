//! Renderer port: trait for the HTML templating collaborator.
//!
//! The core hands the renderer a view name and a context and receives a
//! document back; template storage and engine choice stay behind this
//! boundary.

use serde::Serialize;

/// Context handed to the renderer for one page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageView {
    /// Prediction label to display, if a prediction succeeded.
    pub result: Option<String>,
    /// User-visible failure message, if the request failed.
    pub error: Option<String>,
}

impl PageView {
    /// The empty form view (GET requests).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A view carrying a successful prediction label.
    #[must_use]
    pub fn result(label: impl Into<String>) -> Self {
        Self {
            result: Some(label.into()),
            error: None,
        }
    }

    /// A view carrying a failure message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Error raised by the rendering collaborator.
#[derive(Debug, thiserror::Error)]
#[error("template `{template}` failed to render: {message}")]
pub struct RenderError {
    pub template: String,
    pub message: String,
}

/// Trait for rendering HTML views.
pub trait PageRenderer: Send + Sync {
    /// Render the named template with the given context.
    ///
    /// # Errors
    /// Returns `RenderError` if the template is unknown or rendering fails.
    fn render(&self, template: &str, view: &PageView) -> Result<String, RenderError>;
}

//! minijinja adapter: embedded-template implementation of the renderer port.
//!
//! Templates are compiled into the binary, so the service has no template
//! directory to locate or watch at runtime.

use minijinja::Environment;

use crate::ports::{PageRenderer, PageView, RenderError};

const TEMPLATES: [(&str, &str); 4] = [
    ("index.html", include_str!("../../templates/index.html")),
    ("diabetes.html", include_str!("../../templates/diabetes.html")),
    (
        "lungcancer.html",
        include_str!("../../templates/lungcancer.html"),
    ),
    (
        "braintumor.html",
        include_str!("../../templates/braintumor.html"),
    ),
];

/// Renderer backed by an in-process minijinja environment.
pub struct JinjaRenderer {
    env: Environment<'static>,
}

impl JinjaRenderer {
    /// Build the environment from the embedded templates.
    ///
    /// # Errors
    /// Returns `RenderError` if any embedded template fails to compile.
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source).map_err(|e| RenderError {
                template: name.to_string(),
                message: e.to_string(),
            })?;
        }
        Ok(Self { env })
    }
}

impl PageRenderer for JinjaRenderer {
    fn render(&self, template: &str, view: &PageView) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(template).map_err(|e| RenderError {
            template: template.to_string(),
            message: e.to_string(),
        })?;
        tmpl.render(view).map_err(|e| RenderError {
            template: template.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_result_label() {
        let renderer = JinjaRenderer::new().expect("Templates should compile");
        let body = renderer
            .render("diabetes.html", &PageView::result("Yes"))
            .expect("Should render");
        assert!(body.contains("Prediction: Yes"));
        assert!(body.contains("<form"));
    }

    #[test]
    fn test_renders_error_message() {
        let renderer = JinjaRenderer::new().expect("Templates should compile");
        let body = renderer
            .render("braintumor.html", &PageView::error("bad image"))
            .expect("Should render");
        assert!(body.contains("bad image"));
    }

    #[test]
    fn test_empty_view_has_no_result_block() {
        let renderer = JinjaRenderer::new().expect("Templates should compile");
        let body = renderer
            .render("lungcancer.html", &PageView::empty())
            .expect("Should render");
        assert!(!body.contains("Prediction:"));
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let renderer = JinjaRenderer::new().expect("Templates should compile");
        assert!(renderer.render("nope.html", &PageView::empty()).is_err());
    }
}

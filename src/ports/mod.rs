//! Ports layer: trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (model backends, HTML
//! templating).

mod predictor;
mod renderer;

pub use predictor::{ImagePredictor, PredictError, Preprocessor, TabularPredictor};
pub use renderer::{PageRenderer, PageView, RenderError};

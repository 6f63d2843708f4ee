//! Rendering of the compiled API tree into Rust sources

pub mod context;
pub mod emitter;
pub mod template_renderer;

pub use emitter::{EmitOptions, emit};
pub use template_renderer::TeraTemplateRenderer;

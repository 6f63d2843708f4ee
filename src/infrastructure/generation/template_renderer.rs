//! Tera-based renderer for the generated Rust sources

use serde::Serialize;
use tera::{Context, Tera};

use crate::generation::GenerationError;
use crate::infrastructure::generation::context::{RustAggregatorContext, RustClassContext};

const CLASS_TEMPLATE: &str = "class.rs";
const AGGREGATOR_TEMPLATE: &str = "aggregator.rs";

/// Renders class and aggregator sources from embedded templates
pub struct TeraTemplateRenderer {
    tera: Tera,
}

impl TeraTemplateRenderer {
    pub fn new() -> Result<Self, GenerationError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (CLASS_TEMPLATE, include_str!("../../../templates/class.rs.tera")),
            (
                AGGREGATOR_TEMPLATE,
                include_str!("../../../templates/aggregator.rs.tera"),
            ),
        ])
        .map_err(|e| GenerationError::RenderError(format!("Failed to add template: {}", e)))?;
        Ok(Self { tera })
    }

    pub fn render_class(&self, context: &RustClassContext) -> Result<String, GenerationError> {
        self.render(CLASS_TEMPLATE, context)
    }

    pub fn render_aggregator(
        &self,
        context: &RustAggregatorContext,
    ) -> Result<String, GenerationError> {
        self.render(AGGREGATOR_TEMPLATE, context)
    }

    fn render<T: Serialize>(&self, template: &str, context: &T) -> Result<String, GenerationError> {
        let context = Context::from_serialize(context).map_err(|e| {
            GenerationError::RenderError(format!("Failed to build context for '{}': {}", template, e))
        })?;
        self.tera.render(template, &context).map_err(|e| {
            GenerationError::RenderError(format!("Failed to render template '{}': {}", template, e))
        })
    }
}

//! Prompt templates for the stock insight agents
//!
//! Templates are organized into:
//! - `system`: instructions attached to each agent descriptor
//! - `user`: per-request messages
//!
//! Both are compiled once into a [`PromptLibrary`] at startup.

pub mod system;
pub mod user;

use crate::error::Result;
use minijinja::Environment;
use serde::Serialize;

/// All templates, compiled and ready to render
#[derive(Debug)]
pub struct PromptLibrary {
    env: Environment<'static>,
}

impl PromptLibrary {
    /// Compile every system and user template
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in system::TEMPLATES.iter().chain(user::TEMPLATES) {
            env.add_template(name, source)?;
        }

        Ok(Self { env })
    }

    /// Render a template by name
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        let rendered = self.env.get_template(name)?.render(ctx)?;
        Ok(rendered.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_templates_compile() {
        let library = PromptLibrary::new().unwrap();
        for &(name, _) in system::TEMPLATES.iter().chain(user::TEMPLATES) {
            assert!(library.env.get_template(name).is_ok(), "{name} missing");
        }
    }

    #[test]
    fn test_render_analyst_instructions() {
        let library = PromptLibrary::new().unwrap();
        let prompt = library
            .render(
                system::ANALYST,
                json!({
                    "focus": "valuation analysis",
                    "signals": ["undervalued", "fairly valued", "overvalued"],
                    "guidance": "Compare multiples with the sector.",
                }),
            )
            .unwrap();

        assert!(prompt.starts_with("You are a valuation analysis specialist"));
        assert!(prompt.contains(r#""undervalued", "fairly valued", "overvalued""#));
        assert!(prompt.ends_with("Compare multiples with the sector."));
    }

    #[test]
    fn test_render_analyze_message() {
        let library = PromptLibrary::new().unwrap();
        let prompt = library
            .render(
                user::ANALYZE,
                json!({
                    "kind": "Risk analysis",
                    "ticker": "TSLA",
                    "price": 345.6,
                    "currency": "USD",
                    "as_of": "2025-01-31T21:00:00Z",
                    "company": null,
                    "metrics": [{ "name": "beta", "value": 2.3 }],
                    "missing": ["dividend_yield"],
                }),
            )
            .unwrap();

        assert!(prompt.starts_with("Produce the risk analysis for TSLA."));
        assert!(prompt.contains("- beta: 2.3"));
        assert!(prompt.contains("Not available: dividend_yield"));
        assert!(!prompt.contains("Company:"));
    }

    #[test]
    fn test_unknown_template_is_error() {
        let library = PromptLibrary::new().unwrap();
        assert!(library.render("user/nope", json!({})).is_err());
    }
}

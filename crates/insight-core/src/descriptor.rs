//! Agent descriptors
//!
//! An [`AgentDescriptor`] is the whole definition of an agent: who it is, which
//! model serves it, what it is told, and which tools it may reach. Descriptors
//! are built once at startup and never change afterwards, so the type exposes
//! accessors only.

use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeSet;

/// Immutable agent definition
///
/// # Example
///
/// ```
/// use insight_core::AgentDescriptor;
///
/// let descriptor = AgentDescriptor::builder("data_collector_agent")
///     .model_ref("gemini-2.0-flash")
///     .instructions("Extract the ticker symbol from the user input.")
///     .tool("get_all_stock_data")
///     .build()
///     .unwrap();
///
/// assert!(descriptor.uses_tool("get_all_stock_data"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDescriptor {
    name: String,
    model_ref: String,
    description: String,
    instructions: String,
    tools: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_schema: Option<serde_json::Value>,
}

impl AgentDescriptor {
    /// Start building a descriptor with the given unique name
    pub fn builder(name: impl Into<String>) -> AgentDescriptorBuilder {
        AgentDescriptorBuilder::new(name)
    }

    /// Agent name, unique within an [`AgentRegistry`](crate::AgentRegistry)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque model identifier passed to the inference provider
    pub fn model_ref(&self) -> &str {
        &self.model_ref
    }

    /// Short human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// System instructions sent with every call
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Names of the tools this agent may invoke
    pub fn tools(&self) -> &BTreeSet<String> {
        &self.tools
    }

    pub fn uses_tool(&self, name: &str) -> bool {
        self.tools.contains(name)
    }

    /// JSON schema the agent's structured output must satisfy, if any
    pub fn output_schema(&self) -> Option<&serde_json::Value> {
        self.output_schema.as_ref()
    }

    /// Whether the agent is expected to answer with structured JSON
    pub fn expects_json(&self) -> bool {
        self.output_schema.is_some()
    }
}

/// Builder for [`AgentDescriptor`]
#[derive(Debug, Clone)]
pub struct AgentDescriptorBuilder {
    name: String,
    model_ref: String,
    description: String,
    instructions: String,
    tools: BTreeSet<String>,
    output_schema: Option<serde_json::Value>,
}

impl AgentDescriptorBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_ref: String::new(),
            description: String::new(),
            instructions: String::new(),
            tools: BTreeSet::new(),
            output_schema: None,
        }
    }

    /// Set the model reference
    pub fn model_ref(mut self, model_ref: impl Into<String>) -> Self {
        self.model_ref = model_ref.into();
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the system instructions
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Grant access to a tool by name
    pub fn tool(mut self, name: impl Into<String>) -> Self {
        self.tools.insert(name.into());
        self
    }

    /// Declare the structured output schema
    pub fn output_schema(mut self, schema: serde_json::Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Build the descriptor
    ///
    /// Fails when the name, model reference or instructions are blank.
    pub fn build(self) -> Result<AgentDescriptor> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidDescriptor("name must not be empty".to_string()));
        }
        if self.model_ref.trim().is_empty() {
            return Err(Error::InvalidDescriptor(format!(
                "{name}: model reference must not be empty"
            )));
        }
        if self.instructions.trim().is_empty() {
            return Err(Error::InvalidDescriptor(format!(
                "{name}: instructions must not be empty"
            )));
        }
        if let Some(schema) = &self.output_schema {
            if !schema.is_object() {
                return Err(Error::InvalidDescriptor(format!(
                    "{name}: output schema must be a JSON object"
                )));
            }
        }

        Ok(AgentDescriptor {
            name,
            model_ref: self.model_ref.trim().to_string(),
            description: self.description,
            instructions: self.instructions,
            tools: self.tools,
            output_schema: self.output_schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> AgentDescriptorBuilder {
        AgentDescriptor::builder("chart_analyzer_agent")
            .model_ref("gemini-2.0-flash")
            .instructions("Read the chart.")
    }

    #[test]
    fn test_builder() {
        let descriptor = base()
            .description("Reads stock charts")
            .tool("get_stock_price")
            .tool("get_stock_price")
            .output_schema(json!({"type": "object"}))
            .build()
            .unwrap();

        assert_eq!(descriptor.name(), "chart_analyzer_agent");
        assert_eq!(descriptor.model_ref(), "gemini-2.0-flash");
        assert_eq!(descriptor.tools().len(), 1);
        assert!(descriptor.expects_json());
    }

    #[test]
    fn test_rejects_blank_fields() {
        assert!(AgentDescriptor::builder("  ").model_ref("m").instructions("i").build().is_err());
        assert!(base().model_ref("").build().is_err());
        assert!(base().instructions(" \n").build().is_err());
    }

    #[test]
    fn test_rejects_non_object_schema() {
        let err = base().output_schema(json!(["not", "an", "object"])).build().unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
    }
}

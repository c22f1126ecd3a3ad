//! Registry of agent descriptors
//!
//! Built once at process start and shared read-only afterwards. Lookups never
//! take a lock because nothing can be added after [`AgentRegistryBuilder::build`].

use crate::{AgentDescriptor, Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read-only collection of agent descriptors keyed by name
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, Arc<AgentDescriptor>>,
}

impl AgentRegistry {
    /// Start building a registry
    pub fn builder() -> AgentRegistryBuilder {
        AgentRegistryBuilder::default()
    }

    /// Get a descriptor by name
    pub fn get(&self, name: &str) -> Option<Arc<AgentDescriptor>> {
        self.agents.get(name).cloned()
    }

    /// Get a descriptor that must exist
    pub fn require(&self, name: &str) -> Result<Arc<AgentDescriptor>> {
        self.get(name)
            .ok_or_else(|| Error::NotFound(format!("agent '{name}' is not registered")))
    }

    /// Registered agent names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Check that every tool referenced by a descriptor can be resolved
    ///
    /// `tool_exists` is usually backed by the tool registry. The error lists
    /// every `agent -> tool` pair that could not be resolved.
    pub fn validate_tools<F>(&self, tool_exists: F) -> Result<()>
    where
        F: Fn(&str) -> bool,
    {
        let missing: Vec<String> = self
            .agents
            .values()
            .flat_map(|agent| {
                agent
                    .tools()
                    .iter()
                    .filter(|tool| !tool_exists(tool.as_str()))
                    .map(|tool| format!("{} -> {tool}", agent.name()))
                    .collect::<Vec<_>>()
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InitializationFailed(format!(
                "unresolved tool references: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Builder for [`AgentRegistry`]
#[derive(Debug, Default)]
pub struct AgentRegistryBuilder {
    agents: BTreeMap<String, Arc<AgentDescriptor>>,
    duplicates: Vec<String>,
}

impl AgentRegistryBuilder {
    /// Register a descriptor
    pub fn register(mut self, descriptor: AgentDescriptor) -> Self {
        let name = descriptor.name().to_string();
        if self.agents.contains_key(&name) {
            self.duplicates.push(name);
        } else {
            self.agents.insert(name, Arc::new(descriptor));
        }
        self
    }

    /// Finish the registry, rejecting duplicate names
    pub fn build(self) -> Result<AgentRegistry> {
        if let Some(name) = self.duplicates.into_iter().next() {
            return Err(Error::DuplicateName(name));
        }
        tracing::debug!(agents = self.agents.len(), "agent registry built");
        Ok(AgentRegistry {
            agents: self.agents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, tool: Option<&str>) -> AgentDescriptor {
        let mut builder = AgentDescriptor::builder(name)
            .model_ref("gemini-2.0-flash")
            .instructions("Do the thing.");
        if let Some(tool) = tool {
            builder = builder.tool(tool);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = AgentRegistry::builder()
            .register(descriptor("risk_analysis_agent", None))
            .register(descriptor("data_collector_agent", Some("get_all_stock_data")))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("risk_analysis_agent").is_some());
        assert!(registry.require("missing").is_err());
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["data_collector_agent", "risk_analysis_agent"]
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = AgentRegistry::builder()
            .register(descriptor("dup", None))
            .register(descriptor("dup", None))
            .build();

        assert!(matches!(result, Err(Error::DuplicateName(name)) if name == "dup"));
    }

    #[test]
    fn test_validate_tools() {
        let registry = AgentRegistry::builder()
            .register(descriptor("data_collector_agent", Some("get_all_stock_data")))
            .build()
            .unwrap();

        tokio_test::assert_ok!(registry.validate_tools(|name| name == "get_all_stock_data"));
        tokio_test::assert_err!(registry.validate_tools(|_| false));
        let err = registry.validate_tools(|_| false).unwrap_err();
        assert!(err.to_string().contains("data_collector_agent -> get_all_stock_data"));
    }
}

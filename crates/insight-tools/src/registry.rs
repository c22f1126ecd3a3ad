//! Tool registry for managing available tools
//!
//! The registry is assembled once with [`ToolRegistryBuilder`] and is
//! read-only afterwards, so it can be shared across concurrent requests
//! behind an `Arc` without locking.

use crate::Tool;
use insight_core::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Registry for managing tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Start building a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check whether a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up a tool by name and execute it
    pub async fn invoke(&self, name: &str, params: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("tool '{name}' is not registered")))?;

        debug!(tool = name, "invoking tool");
        tool.execute(params).await
    }

    /// Same as [`invoke`](Self::invoke) but bounded by `timeout`
    ///
    /// Expiry is reported as [`Error::Timeout`]; the tool future is dropped.
    pub async fn invoke_with_timeout(
        &self,
        name: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value> {
        match tokio::time::timeout(timeout, self.invoke(name, params)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(tool = name, timeout_ms = timeout.as_millis() as u64, "tool timed out");
                Err(Error::Timeout {
                    operation: name.to_string(),
                    seconds: timeout.as_secs_f64(),
                })
            }
        }
    }
}

/// Builder for [`ToolRegistry`]
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: HashMap<String, Arc<dyn Tool>>,
    duplicates: Vec<String>,
}

impl ToolRegistryBuilder {
    /// Register a tool
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            self.duplicates.push(name);
        } else {
            self.tools.insert(name, tool);
        }
        self
    }

    /// Finish the registry, rejecting duplicate names
    pub fn build(self) -> Result<ToolRegistry> {
        if let Some(name) = self.duplicates.into_iter().next() {
            return Err(Error::DuplicateName(name));
        }
        Ok(ToolRegistry { tools: self.tools })
    }
}

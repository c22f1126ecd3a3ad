//! Tool contracts and the registry that owns them
//!
//! A tool is an async function with a declared JSON input and output contract.
//! Agents refer to tools by name only; the [`ToolRegistry`] resolves the name
//! at dispatch time and owns the tool for the lifetime of the process.

pub mod registry;
pub mod schema;
pub mod tool;

pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use tool::Tool;

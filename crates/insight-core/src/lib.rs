//! Core abstractions for stock-insight
//!
//! Agents in this workspace are declarative records: a name, a model reference,
//! instruction text, and the names of the tools they may call. This crate holds
//! those records, the registry that owns them, and the request-scoped context
//! shared by every component handling a single query.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod registry;

pub use context::RequestContext;
pub use descriptor::{AgentDescriptor, AgentDescriptorBuilder};
pub use error::{Error, Result};
pub use registry::{AgentRegistry, AgentRegistryBuilder};

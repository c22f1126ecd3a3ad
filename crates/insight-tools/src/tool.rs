//! Tool trait definition

use async_trait::async_trait;
use insight_core::Result;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Each tool provides a name, description, and JSON schemas for both its input
/// and its output so callers know what they will get back.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// `params` should match [`Tool::input_schema`]. Implementations return
    /// [`insight_core::Error::NotFound`] when the requested entity does not
    /// exist and [`insight_core::Error::InvalidInput`] for malformed params.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use insight_tools::schema;
    /// use serde_json::json;
    ///
    /// let schema = schema::object(
    ///     json!({ "ticker": schema::string("Ticker symbol, e.g. AAPL") }),
    ///     &["ticker"],
    /// );
    /// assert_eq!(schema["required"][0], "ticker");
    /// ```
    fn input_schema(&self) -> Value;

    /// Get the tool's output schema (JSON Schema format)
    fn output_schema(&self) -> Value;
}

//! Structured output handling
//!
//! Models asked for JSON still wrap it in code fences, prepend a sentence, or
//! return something that is not JSON at all. Everything here turns that text
//! into a typed value or a [`LLMError::MalformedOutput`]; nothing downstream
//! ever sees unvalidated model output.

use crate::{LLMError, Result};
use serde::de::DeserializeOwned;

/// Locate the first balanced JSON object in `text`
///
/// Braces inside string literals are ignored. Returns `None` when no complete
/// object is present.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the JSON object embedded in `text` into `T`
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T> {
    let json = extract_json(text).ok_or_else(|| LLMError::malformed("no JSON object", text))?;
    serde_json::from_str(json).map_err(|e| LLMError::malformed(e.to_string(), json))
}

use serde::de::DeserializeOwned;

use nl_core::Result;

/// Models often wrap JSON answers in markdown fences; drop the markers
/// before parsing. Anything that still fails to parse is treated as a
/// generation failure by the callers.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let cleaned = strip_code_fences(text);
    Ok(serde_json::from_str(cleaned.trim())?)
}

use std::path::Path;

use serde_json::Value;

use crate::error::ExtractError;

/// Read one match-sheet JSON file into a nested `Value`. No schema is
/// enforced here; missing keys surface later when an extractor needs them.
pub fn load_document(path: &Path) -> Result<Value, ExtractError> {
    let origin = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|err| ExtractError::DocumentParse {
        origin: origin.clone(),
        detail: err.to_string(),
    })?;
    parse_document(&raw, &origin)
}

pub fn parse_document(raw: &str, origin: &str) -> Result<Value, ExtractError> {
    serde_json::from_str::<Value>(raw.trim()).map_err(|err| ExtractError::DocumentParse {
        origin: origin.to_string(),
        detail: err.to_string(),
    })
}

use thiserror::Error;

/// An import payload that is not valid JSON, or not an array of
/// two-element `[start, end]` number pairs. The log is left untouched
/// whenever this is returned.
#[derive(Debug, Error)]
#[error("malformed import payload: {0}")]
pub struct MalformedImport(#[from] serde_json::Error);

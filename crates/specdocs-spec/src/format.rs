//! Serialization format detection and normalization to JSON.

use bytes::Bytes;

use crate::canonical::canonicalize;
use crate::error::NormalizeError;

/// Serialization format of a fetched document, decided from its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    /// Detect the format from the URL suffix.
    ///
    /// Only a case-sensitive `.yaml` or `.yml` suffix selects YAML. Everything
    /// else is assumed to already be JSON; the content is never inspected.
    pub fn detect(url: &str) -> Self {
        if url.ends_with(".yaml") || url.ends_with(".yml") {
            SourceFormat::Yaml
        } else {
            SourceFormat::Json
        }
    }
}

/// Normalize a fetched document to JSON bytes.
///
/// JSON is passed through untouched (and unvalidated). YAML is parsed,
/// canonicalized and re-serialized.
pub fn normalize(url: &str, raw: Bytes) -> Result<Bytes, NormalizeError> {
    match SourceFormat::detect(url) {
        SourceFormat::Json => Ok(raw),
        SourceFormat::Yaml => yaml_to_json(&raw).map(Bytes::from),
    }
}

fn yaml_to_json(raw: &[u8]) -> Result<Vec<u8>, NormalizeError> {
    let tree: serde_yaml::Value = serde_yaml::from_slice(raw)?;
    let canonical = canonicalize(tree)?;
    serde_json::to_vec(&canonical).map_err(|e| NormalizeError::Serialization(e.to_string()))
}

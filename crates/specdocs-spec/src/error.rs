use thiserror::Error;

/// Errors produced while turning a fetched document into canonical JSON.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The payload was served under a YAML suffix but does not parse as YAML.
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// A mapping key somewhere in the document is not a string.
    #[error("mapping key is not a string: {0}")]
    NonStringKey(String),

    /// The canonical tree could not be written as JSON.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Structural failures of the type policy. Unsupported versions and invalid
/// schemas are decisions, not errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The document is not a JSON object.
    #[error("{0}")]
    Parse(#[source] serde_json::Error),

    /// The document does not have the shape of an OpenAPI document.
    #[error("{0}")]
    Load(String),
}

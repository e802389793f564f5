//! Type-specific acceptance rules.
//!
//! Each [`SpecType`] decides, from the normalized JSON, whether the document
//! renders with its own template or with a rejection page.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::PolicyError;
use crate::openapi::{self, ValidationIssue};

/// Template shown for AsyncAPI 3.x documents.
pub const UNSUPPORTED_VERSION_TEMPLATE: &str = "unsupported_version.html";

/// Template shown for OpenAPI documents that fail validation.
pub const INVALID_SCHEMA_TEMPLATE: &str = "error_invalid_schema.html";

/// The kind of specification a documentation page is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecType {
    OpenApi,
    AsyncApi,
}

/// Returned when a path segment names no known specification type.
#[derive(Debug, Error)]
#[error("unsupported specification type: {0}")]
pub struct UnknownSpecType(pub String);

impl SpecType {
    /// All supported types.
    pub const ALL: [SpecType; 2] = [SpecType::OpenApi, SpecType::AsyncApi];

    /// The identifier used in request paths.
    pub fn as_str(self) -> &'static str {
        match self {
            SpecType::OpenApi => "openapi",
            SpecType::AsyncApi => "asyncapi",
        }
    }

    /// The template a document of this type renders with when accepted.
    pub fn template(self) -> &'static str {
        match self {
            SpecType::OpenApi => "openapi.html",
            SpecType::AsyncApi => "asyncapi.html",
        }
    }

    /// Apply this type's acceptance rules to normalized JSON.
    pub fn apply(self, json: &[u8]) -> Result<Decision, PolicyError> {
        match self {
            SpecType::OpenApi => openapi_policy(json),
            SpecType::AsyncApi => asyncapi_policy(json),
        }
    }
}

impl FromStr for SpecType {
    type Err = UnknownSpecType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpecType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownSpecType(s.to_string()))
    }
}

impl fmt::Display for SpecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a document was routed to a rejection template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The document declares a version the renderer cannot display.
    UnsupportedVersion(String),
    /// The document loaded but failed validation.
    InvalidSchema(Vec<ValidationIssue>),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnsupportedVersion(version) => {
                write!(f, "unsupported version {}", version)
            }
            Rejection::InvalidSchema(issues) => {
                write!(f, "{} validation issue(s)", issues.len())?;
                if let Some(first) = issues.first() {
                    write!(f, ", first: {}", first)?;
                }
                Ok(())
            }
        }
    }
}

/// Outcome of the type policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Render the document with the named template.
    RenderNormal(&'static str),
    /// Render the named rejection template without the document.
    RenderRejection(&'static str, Rejection),
}

impl Decision {
    /// The template this decision renders with.
    pub fn template(&self) -> &'static str {
        match self {
            Decision::RenderNormal(template) | Decision::RenderRejection(template, _) => *template,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Decision::RenderRejection(..))
    }
}

/// Decide how a normalized document of the given type is rendered.
pub fn apply_policy(spec_type: SpecType, json: &[u8]) -> Result<Decision, PolicyError> {
    spec_type.apply(json)
}

fn asyncapi_policy(json: &[u8]) -> Result<Decision, PolicyError> {
    let spec: Map<String, Value> = serde_json::from_slice(json).map_err(PolicyError::Parse)?;

    match spec.get("asyncapi").and_then(Value::as_str) {
        // The AsyncAPI renderer does not support 3.x documents.
        Some(version) if version.starts_with("3.") => {
            tracing::debug!(version, "AsyncAPI version not supported by renderer");
            Ok(Decision::RenderRejection(
                UNSUPPORTED_VERSION_TEMPLATE,
                Rejection::UnsupportedVersion(version.to_string()),
            ))
        }
        _ => Ok(Decision::RenderNormal(SpecType::AsyncApi.template())),
    }
}

fn openapi_policy(json: &[u8]) -> Result<Decision, PolicyError> {
    let document = openapi::load(json)?;
    let issues = document.validate();
    if issues.is_empty() {
        return Ok(Decision::RenderNormal(SpecType::OpenApi.template()));
    }

    tracing::debug!(issues = issues.len(), "OpenAPI document failed validation");
    Ok(Decision::RenderRejection(
        INVALID_SCHEMA_TEMPLATE,
        Rejection::InvalidSchema(issues),
    ))
}

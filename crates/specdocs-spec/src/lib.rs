//! Normalization and acceptance policy for remote API spec documents.
//!
//! Turns the raw bytes of an OpenAPI or AsyncAPI document into canonical JSON,
//! decides which documentation template it renders with, and encodes it for
//! embedding into that template. Everything here is synchronous and free of I/O.

pub mod canonical;
pub mod error;
pub mod format;
pub mod openapi;
pub mod payload;
pub mod policy;

pub use canonical::canonicalize;
pub use error::{NormalizeError, PolicyError};
pub use format::{normalize, SourceFormat};
pub use openapi::{OpenApiDocument, ValidationIssue};
pub use payload::{RenderContext, ENCODED_SPEC_CONTENT};
pub use policy::{
    apply_policy, Decision, Rejection, SpecType, UnknownSpecType, INVALID_SCHEMA_TEMPLATE,
    UNSUPPORTED_VERSION_TEMPLATE,
};
